//! Derived networks: node sets, weighted edge layers and slice labels.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::DocumentId;

/// Edge weight. Counts and their differences, so always finite.
pub type Weight = i64;

/// Whether a network projects actors onto each other or links actors to concepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkType {
    OneMode,
    TwoMode,
}

/// What a layer's weights measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    /// Two-mode statement counts per (row, column) pair.
    Incidence,
    Congruence,
    Conflict,
    /// Congruence minus conflict; may be negative.
    Subtract,
}

impl LayerKind {
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Incidence => "incidence",
            LayerKind::Congruence => "congruence",
            LayerKind::Conflict => "conflict",
            LayerKind::Subtract => "subtract",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Slice label
// ============================================================================

/// Identifies the time slice a network was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SliceLabel {
    /// A date range. Whole-range slices are inclusive of `end`; time-window
    /// slices cover `[start, end)` except the last, which is clamped to the
    /// inclusive range end.
    Range { start: NaiveDateTime, end: NaiveDateTime },
    Document {
        id: DocumentId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<NaiveDateTime>,
    },
    Year { year: i32 },
}

const LABEL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl fmt::Display for SliceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceLabel::Range { start, end } => write!(
                f,
                "{}..{}",
                start.format(LABEL_DATE_FORMAT),
                end.format(LABEL_DATE_FORMAT)
            ),
            SliceLabel::Document { id, date, .. } => match date {
                Some(d) => write!(f, "document {id} ({})", d.format(LABEL_DATE_FORMAT)),
                None => write!(f, "document {id}"),
            },
            SliceLabel::Year { year } => write!(f, "{year}"),
        }
    }
}

// ============================================================================
// NodeSet
// ============================================================================

/// Node labels in first-appearance order, deduplicated by exact string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label if absent and return its position.
    pub fn insert(&mut self, label: &str) -> usize {
        if let Some(&i) = self.index.get(label) {
            return i;
        }
        let i = self.labels.len();
        self.labels.push(label.to_owned());
        self.index.insert(label.to_owned(), i);
        i
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn get(&self, i: usize) -> Option<&str> {
        self.labels.get(i).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

impl<S: AsRef<str>> FromIterator<S> for NodeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = NodeSet::new();
        for label in iter {
            set.insert(label.as_ref());
        }
        set
    }
}

// ============================================================================
// Edge layers
// ============================================================================

/// Sparse weights keyed by (row position, column position).
///
/// One-mode layers store each unordered pair once, with the lower node
/// position first.
pub type EdgeMap = BTreeMap<(usize, usize), Weight>;

/// A named set of weighted edges over the network's node sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub kind: LayerKind,
    pub edges: EdgeMap,
}

impl Layer {
    pub fn new(kind: LayerKind) -> Self {
        Self { kind, edges: EdgeMap::new() }
    }

    pub fn add(&mut self, row: usize, col: usize, delta: Weight) {
        *self.edges.entry((row, col)).or_insert(0) += delta;
    }

    /// Drop entries whose accumulated weight is zero.
    pub fn prune_zero(&mut self) {
        self.edges.retain(|_, w| *w != 0);
    }
}

// ============================================================================
// Network
// ============================================================================

/// The network derived from one time slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub label: SliceLabel,
    pub network_type: NetworkType,
    /// Mode-1 nodes (rows).
    pub rows: NodeSet,
    /// Mode-2 nodes (columns). Equal to `rows` for one-mode networks.
    pub columns: NodeSet,
    pub layers: Vec<Layer>,
}

impl Network {
    pub fn is_one_mode(&self) -> bool {
        self.network_type == NetworkType::OneMode
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    /// Weight between two labels in a layer; zero when absent.
    ///
    /// One-mode lookups are symmetric.
    pub fn weight(&self, kind: LayerKind, row: &str, col: &str) -> Weight {
        let (Some(layer), Some(r), Some(c)) =
            (self.layer(kind), self.rows.position(row), self.columns.position(col))
        else {
            return 0;
        };
        let key = if self.is_one_mode() { (r.min(c), r.max(c)) } else { (r, c) };
        layer.edges.get(&key).copied().unwrap_or(0)
    }

    /// Edges of a layer as `(row label, column label, weight)`, in key order.
    pub fn edges(&self, kind: LayerKind) -> Vec<(&str, &str, Weight)> {
        let Some(layer) = self.layer(kind) else {
            return Vec::new();
        };
        layer
            .edges
            .iter()
            .filter_map(|(&(r, c), &w)| Some((self.rows.get(r)?, self.columns.get(c)?, w)))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.layers.iter().map(|l| l.edges.len()).sum()
    }

    /// A network with no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }
}
