//! In-memory statement store.
//!
//! This is the reference implementation of `StatementStore`. It keeps
//! statement types, documents and statements in `RwLock`-protected
//! collections. Writes go through inherent methods; the trait is read-only.
//!
//! Use this store for:
//! - Testing the filter, aggregator and builder end to end
//! - Running exports over a JSON snapshot exported from a coding database

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Snapshot, StatementStore};
use crate::model::*;
use crate::spec::DateRange;
use crate::{Error, Result};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory statement storage.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    types: RwLock<HashMap<StatementTypeId, StatementType>>,
    documents: RwLock<HashMap<DocumentId, Document>>,
    statements: RwLock<HashMap<StatementId, Statement>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot, checking that every statement refers
    /// to a known statement type.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let store = Self::new();
        for st in snapshot.statement_types {
            store.add_statement_type(st);
        }
        for doc in snapshot.documents {
            store.add_document(doc);
        }
        for statement in snapshot.statements {
            store.add_statement(statement)?;
        }
        Ok(store)
    }

    /// Load a JSON snapshot file.
    pub async fn open_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        let snapshot = Snapshot::from_json(&text)?;
        tracing::debug!(
            path = %path.display(),
            statements = snapshot.statements.len(),
            documents = snapshot.documents.len(),
            "snapshot loaded"
        );
        Self::from_snapshot(snapshot)
    }

    pub fn add_statement_type(&self, st: StatementType) {
        self.inner.types.write().insert(st.id, st);
    }

    pub fn add_document(&self, doc: Document) {
        self.inner.documents.write().insert(doc.id, doc);
    }

    /// Add a statement. Fails if its statement type is unknown or its id is taken.
    pub fn add_statement(&self, statement: Statement) -> Result<StatementId> {
        if !self.inner.types.read().contains_key(&statement.statement_type) {
            return Err(Error::NotFound(format!("Statement type {}", statement.statement_type)));
        }
        let id = statement.id;
        match self.inner.statements.write().entry(id) {
            Entry::Occupied(_) => Err(Error::Storage(format!("duplicate statement id {id}"))),
            Entry::Vacant(slot) => {
                slot.insert(statement);
                Ok(id)
            }
        }
    }

    pub fn statement_count(&self) -> usize {
        self.inner.statements.read().len()
    }
}

// ============================================================================
// StatementStore impl
// ============================================================================

#[async_trait]
impl StatementStore for MemoryStore {
    async fn statement_types(&self) -> Result<Vec<StatementType>> {
        let mut types: Vec<StatementType> = self.inner.types.read().values().cloned().collect();
        types.sort_by_key(|t| t.id);
        Ok(types)
    }

    async fn statement_type(&self, id: StatementTypeId) -> Result<Option<StatementType>> {
        Ok(self.inner.types.read().get(&id).cloned())
    }

    async fn statements_by_type(
        &self,
        statement_type: StatementTypeId,
        range: DateRange,
    ) -> Result<Vec<Statement>> {
        let mut out: Vec<Statement> = self
            .inner
            .statements
            .read()
            .values()
            .filter(|s| s.statement_type == statement_type && range.contains(&s.date))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn date_bounds(&self, statement_type: StatementTypeId) -> Result<Option<DateRange>> {
        let statements = self.inner.statements.read();
        Ok(DateRange::spanning(
            statements
                .values()
                .filter(|s| s.statement_type == statement_type)
                .map(|s| &s.date),
        ))
    }

    async fn document(&self, id: DocumentId) -> Result<Option<Document>> {
        Ok(self.inner.documents.read().get(&id).cloned())
    }
}
