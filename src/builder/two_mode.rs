//! Two-mode construction: direct actor × concept incidence counts.

use crate::aggregate::TimeSlice;
use crate::filter::node_label;
use crate::model::{Layer, LayerKind, Network, NetworkType};
use crate::spec::ValidSpec;

use super::NodeSeed;

pub(super) fn build(slice: &TimeSlice<'_>, spec: &ValidSpec, seed: NodeSeed) -> Network {
    let NodeSeed { mut rows, mut columns } = seed;
    let mut layer = Layer::new(LayerKind::Incidence);

    for s in &slice.statements {
        let (Some(v1), Some(v2)) = (node_label(s, &spec.mode1), node_label(s, &spec.mode2)) else {
            continue;
        };
        let r = rows.insert(&v1);
        let c = columns.insert(&v2);
        layer.add(r, c, 1);
    }

    Network {
        label: slice.label.clone(),
        network_type: NetworkType::TwoMode,
        rows,
        columns,
        layers: vec![layer],
    }
}
