//! JSON snapshot of a coded corpus: statement types, documents, statements.
//!
//! ```json
//! {
//!   "statement_types": [{"id": 1, "name": "DNA Statement",
//!     "variables": [{"name": "person", "kind": "short-text"}]}],
//!   "documents": [{"id": 1, "title": "Hearing", "date": "2020-01-01T00:00:00"}],
//!   "statements": [{"id": 1, "statement_type": 1, "document": 1,
//!     "date": "2020-01-01T00:00:00", "values": {"person": "EPA"}}]
//! }
//! ```
//!
//! Statements may also carry `start`/`stop` text offsets. Only statements
//! with both are checked for duplicate imports.

use serde::{Deserialize, Serialize};

use crate::model::{Document, Statement, StatementType};
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub statement_types: Vec<StatementType>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
