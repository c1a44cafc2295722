//! # Statement Store Trait
//!
//! The read-only contract between the network engine and wherever coded
//! statements live. The engine never writes through it and assumes nothing
//! about the storage technology behind it.
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory, loadable from a JSON snapshot |

pub mod memory;
pub mod snapshot;

use async_trait::async_trait;

use crate::model::*;
use crate::spec::DateRange;
use crate::Result;

pub use memory::MemoryStore;
pub use snapshot::Snapshot;

// ============================================================================
// StatementStore Trait
// ============================================================================

/// Narrow query interface the engine reads statements through.
#[async_trait]
pub trait StatementStore: Send + Sync + 'static {
    // ========================================================================
    // Schema
    // ========================================================================

    /// All statement types, in id order.
    async fn statement_types(&self) -> Result<Vec<StatementType>>;

    /// Get a statement type by id. Returns None if not found.
    async fn statement_type(&self, id: StatementTypeId) -> Result<Option<StatementType>>;

    /// Find a statement type by its name.
    ///
    /// Default: scans `statement_types()`.
    async fn statement_type_by_name(&self, name: &str) -> Result<Option<StatementType>> {
        Ok(self
            .statement_types()
            .await?
            .into_iter()
            .find(|t| t.name == name))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Statements of one type dated within `range` (inclusive), ordered by
    /// date, then id.
    async fn statements_by_type(
        &self,
        statement_type: StatementTypeId,
        range: DateRange,
    ) -> Result<Vec<Statement>>;

    /// Earliest and latest statement date of a type. None if it has no statements.
    async fn date_bounds(&self, statement_type: StatementTypeId) -> Result<Option<DateRange>>;

    // ========================================================================
    // Documents
    // ========================================================================

    /// Get a document by id.
    async fn document(&self, id: DocumentId) -> Result<Option<Document>>;

    /// Batch document lookup; unknown ids are omitted.
    ///
    /// Default falls back to sequential `document` calls.
    async fn documents(&self, ids: &[DocumentId]) -> Result<Vec<Document>> {
        let mut docs = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(doc) = self.document(id).await? {
                docs.push(doc);
            }
        }
        Ok(docs)
    }
}
