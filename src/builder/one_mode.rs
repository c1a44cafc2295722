//! One-mode construction: actors linked through shared concepts.
//!
//! Statements are grouped by concept first; pairwise comparison only happens
//! inside a concept group. Every pair of statements by two different actors
//! about the same concept contributes one unit of congruence (equal agreement
//! values) or conflict (differing values).

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::aggregate::TimeSlice;
use crate::filter::{agreement_value, node_label};
use crate::model::{Layer, LayerKind, Network, NetworkType, NodeSet, Value};
use crate::spec::{AgreementPattern, ValidSpec};

/// (actor position, agreement value) of one statement in a concept group.
type GroupEntry = (usize, Value);

pub(super) fn build(slice: &TimeSlice<'_>, spec: &ValidSpec, mut rows: NodeSet) -> Network {
    let layers = match spec.agreement() {
        Some((variable, kind)) => {
            let mut groups: HashMap<String, SmallVec<[GroupEntry; 8]>> = HashMap::new();
            for s in &slice.statements {
                let (Some(actor), Some(concept)) = (node_label(s, &spec.mode1), node_label(s, &spec.mode2))
                else {
                    continue;
                };
                let agreement = match agreement_value(s, variable, kind) {
                    Ok(v) => v,
                    Err(message) => {
                        tracing::warn!(statement = %s.id, "skipping statement: {message}");
                        continue;
                    }
                };
                let a = rows.insert(&actor);
                groups.entry(concept).or_default().push((a, agreement));
            }
            project(groups.values().map(|g| g.as_slice()), spec.agreement_pattern)
        }
        None => Vec::new(),
    };

    Network {
        label: slice.label.clone(),
        network_type: NetworkType::OneMode,
        columns: rows.clone(),
        rows,
        layers,
    }
}

/// Accumulate pairwise agreement over concept groups into layers.
fn project<'g>(groups: impl Iterator<Item = &'g [GroupEntry]>, pattern: AgreementPattern) -> Vec<Layer> {
    let mut congruence = Layer::new(LayerKind::Congruence);
    let mut conflict = Layer::new(LayerKind::Conflict);

    for group in groups {
        for (i, (a, va)) in group.iter().enumerate() {
            for (b, vb) in &group[i + 1..] {
                if a == b {
                    continue;
                }
                let key = ((*a).min(*b), (*a).max(*b));
                if va == vb {
                    congruence.add(key.0, key.1, 1);
                } else {
                    conflict.add(key.0, key.1, 1);
                }
            }
        }
    }

    match pattern {
        AgreementPattern::Congruence => vec![congruence],
        AgreementPattern::Conflict => vec![conflict],
        AgreementPattern::Separate => vec![congruence, conflict],
        AgreementPattern::Subtract => {
            let mut subtract = Layer::new(LayerKind::Subtract);
            for (&(a, b), &w) in &congruence.edges {
                subtract.add(a, b, w);
            }
            for (&(a, b), &w) in &conflict.edges {
                subtract.add(a, b, -w);
            }
            subtract.prune_zero();
            vec![subtract]
        }
    }
}
