//! Network builder: projects one time slice into a network.
//!
//! ```text
//!   TimeSlice ──► two_mode::build ──► incidence layer (actor × concept)
//!            └──► one_mode::build ──► congruence / conflict / subtract layers
//! ```
//!
//! Construction is a pure function of the slice and the validated spec, so
//! slices can be built independently and in parallel.

mod one_mode;
mod two_mode;

use crate::aggregate::TimeSlice;
use crate::filter::node_label;
use crate::model::{Network, NetworkType, NodeSet, Statement};
use crate::spec::ValidSpec;

/// Node sets a network starts from before any statement is visited.
///
/// Used to keep isolates: nodes seen elsewhere in the export but inactive
/// in this slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSeed {
    pub rows: NodeSet,
    pub columns: NodeSet,
}

impl NodeSeed {
    /// Every mode-1 and mode-2 label of `statements`, in first-appearance order.
    pub fn from_statements(statements: &[&Statement], spec: &ValidSpec) -> Self {
        let mut seed = NodeSeed::default();
        for s in statements {
            if let (Some(v1), Some(v2)) = (node_label(s, &spec.mode1), node_label(s, &spec.mode2)) {
                seed.rows.insert(&v1);
                seed.columns.insert(&v2);
            }
        }
        if spec.network_type == NetworkType::OneMode {
            seed.columns = seed.rows.clone();
        }
        seed
    }
}

/// Build the network for one slice.
pub fn build(slice: &TimeSlice<'_>, spec: &ValidSpec) -> Network {
    build_seeded(slice, spec, None)
}

/// Build the network for one slice, starting from the given node sets.
pub fn build_seeded(slice: &TimeSlice<'_>, spec: &ValidSpec, seed: Option<&NodeSeed>) -> Network {
    let seed = seed.cloned().unwrap_or_default();
    let network = match spec.network_type {
        NetworkType::TwoMode => two_mode::build(slice, spec, seed),
        NetworkType::OneMode => one_mode::build(slice, spec, seed.rows),
    };
    tracing::debug!(
        slice = %network.label,
        rows = network.rows.len(),
        columns = network.columns.len(),
        edges = network.edge_count(),
        "network built"
    );
    network
}
