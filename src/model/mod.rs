//! # Statement & Network Model
//!
//! Plain DTOs shared by every stage: statements and their typed values on the
//! way in, derived networks on the way out.
//!
//! Design rule: no storage handles, no I/O, no async here.

pub mod value;
pub mod variable_map;
pub mod statement;
pub mod statement_type;
pub mod network;

pub use value::{Value, VariableKind, KindMismatch};
pub use variable_map::VariableMap;
pub use statement::{Statement, StatementId, Document, DocumentId, StatementTypeId};
pub use statement_type::{StatementType, Variable};
pub use network::{
    Network, NetworkType, NodeSet, Layer, LayerKind, EdgeMap, Weight, SliceLabel,
};
