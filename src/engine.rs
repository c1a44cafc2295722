//! Export pipeline: store → dedup → filter → aggregate → build.
//!
//! ```text
//!  StatementStore ──► statements_by_type ──► deduplicate
//!                                              │
//!        filter ◄──────────────────────────────┘
//!          │
//!      aggregate ──► [TimeSlice, ...] ──► build (per slice, parallel)
//!                                              │
//!                              [Network, ...] in slice order
//! ```
//!
//! Only the store read is I/O. Everything after it is a pure function of
//! the statement snapshot and the validated spec.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use hashbrown::HashMap;

use crate::aggregate::{aggregate, TimeSlice};
use crate::builder::{build_seeded, NodeSeed};
use crate::filter::{filter, DataWarning};
use crate::model::{DocumentId, Network, SliceLabel, Statement};
use crate::spec::{AggregationRule, ConfigError, NetworkSpec, ValidSpec};
use crate::storage::StatementStore;
use crate::Result;

// ============================================================================
// Control: cancellation and progress
// ============================================================================

/// Shared handle for cancelling a running export and watching its progress.
///
/// Cancellation is checked once per slice.
#[derive(Debug, Default)]
pub struct ExportControl {
    cancelled: AtomicBool,
    total: AtomicUsize,
    completed: AtomicUsize,
}

impl ExportControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Number of slices the current export will build.
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Number of slices built so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.completed.store(0, Ordering::Relaxed);
    }

    fn tick(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Networks of a completed export, with the statements skipped along the way.
#[derive(Debug, Clone, Default)]
pub struct ExportResult {
    /// One network per slice, in slice order.
    pub networks: Vec<Network>,
    pub warnings: Vec<DataWarning>,
    pub statements_read: usize,
    pub duplicates_removed: usize,
    pub statements_used: usize,
}

impl ExportResult {
    /// True when no slice was produced.
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum ExportOutcome {
    Completed(ExportResult),
    /// The export was cancelled; nothing was kept.
    Cancelled,
}

impl ExportOutcome {
    pub fn completed(self) -> Option<ExportResult> {
        match self {
            ExportOutcome::Completed(r) => Some(r),
            ExportOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExportOutcome::Cancelled)
    }
}

/// Options that shape the statement snapshot before it reaches the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Drop statements imported twice (same type, document and span).
    pub deduplicate: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { deduplicate: true }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run a full export against a statement store.
///
/// The spec is validated against its statement type before any statement
/// is read. Store errors are returned unchanged.
pub async fn export<S: StatementStore + ?Sized>(
    store: &S,
    spec: &NetworkSpec,
    options: EngineOptions,
    control: &ExportControl,
) -> Result<ExportOutcome> {
    let schema = store
        .statement_type(spec.statement_type)
        .await?
        .ok_or_else(|| ConfigError::UnknownStatementType(spec.statement_type.to_string()))?;
    let valid = spec.validate(&schema)?;

    let mut statements = store.statements_by_type(spec.statement_type, spec.date_range).await?;
    let statements_read = statements.len();
    let duplicates_removed = if options.deduplicate { deduplicate(&mut statements) } else { 0 };
    tracing::debug!(read = statements_read, duplicates = duplicates_removed, "statements loaded");

    let outcome = run(&statements, &valid, control);
    let ExportOutcome::Completed(mut result) = outcome else {
        tracing::info!("export cancelled");
        return Ok(ExportOutcome::Cancelled);
    };
    result.statements_read = statements_read;
    result.duplicates_removed = duplicates_removed;

    if valid.aggregation == AggregationRule::PerDocument {
        label_documents(store, &mut result.networks).await?;
    }

    tracing::info!(
        networks = result.networks.len(),
        statements = result.statements_used,
        warnings = result.warnings.len(),
        "export finished"
    );
    Ok(ExportOutcome::Completed(result))
}

/// Filter, aggregate and build over an in-memory statement snapshot.
pub fn run(statements: &[Statement], spec: &ValidSpec, control: &ExportControl) -> ExportOutcome {
    let filtered = filter(statements, spec);
    let slices = aggregate(&filtered.statements, spec);
    let seed = spec
        .isolates
        .then(|| NodeSeed::from_statements(&filtered.statements, spec));

    control.start(slices.len());
    let Some(networks) = build_all(&slices, spec, seed.as_ref(), control) else {
        return ExportOutcome::Cancelled;
    };

    ExportOutcome::Completed(ExportResult {
        networks,
        warnings: filtered.warnings,
        statements_read: statements.len(),
        duplicates_removed: 0,
        statements_used: filtered.statements.len(),
    })
}

fn build_one(
    slice: &TimeSlice<'_>,
    spec: &ValidSpec,
    seed: Option<&NodeSeed>,
    control: &ExportControl,
) -> Option<Network> {
    if control.is_cancelled() {
        return None;
    }
    let network = build_seeded(slice, spec, seed);
    control.tick();
    Some(network)
}

#[cfg(feature = "parallel")]
fn build_all(
    slices: &[TimeSlice<'_>],
    spec: &ValidSpec,
    seed: Option<&NodeSeed>,
    control: &ExportControl,
) -> Option<Vec<Network>> {
    use rayon::prelude::*;

    let built: Vec<Option<Network>> = slices
        .par_iter()
        .map(|slice| build_one(slice, spec, seed, control))
        .collect();
    if control.is_cancelled() {
        return None;
    }
    built.into_iter().collect()
}

#[cfg(not(feature = "parallel"))]
fn build_all(
    slices: &[TimeSlice<'_>],
    spec: &ValidSpec,
    seed: Option<&NodeSeed>,
    control: &ExportControl,
) -> Option<Vec<Network>> {
    let mut networks = Vec::with_capacity(slices.len());
    for slice in slices {
        networks.push(build_one(slice, spec, seed, control)?);
    }
    if control.is_cancelled() {
        return None;
    }
    Some(networks)
}

/// Remove statements imported more than once, keeping the first occurrence.
///
/// Two statements are duplicates when they share type, document and span.
/// Statements without a span are always kept. Returns the number removed.
pub fn deduplicate(statements: &mut Vec<Statement>) -> usize {
    let before = statements.len();
    let mut seen = HashSet::with_capacity(before);
    statements.retain(|s| s.span_key().is_none_or(|key| seen.insert(key)));
    before - statements.len()
}

/// Fill per-document slice labels with the document's title and date.
async fn label_documents<S: StatementStore + ?Sized>(store: &S, networks: &mut [Network]) -> Result<()> {
    let ids: Vec<DocumentId> = networks
        .iter()
        .filter_map(|n| match n.label {
            SliceLabel::Document { id, .. } => Some(id),
            _ => None,
        })
        .collect();
    let docs: HashMap<DocumentId, _> = store
        .documents(&ids)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();
    for network in networks {
        if let SliceLabel::Document { id, title, date } = &mut network.label {
            if let Some(doc) = docs.get(&*id) {
                *title = Some(doc.title.clone());
                *date = Some(doc.date);
            }
        }
    }
    Ok(())
}
