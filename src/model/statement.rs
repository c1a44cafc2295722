//! Statements and the documents they are coded in.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Value, VariableMap};

/// Opaque statement identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementId(pub u64);

/// Opaque document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

/// Opaque statement type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementTypeId(pub u64);

macro_rules! display_id {
    ($($t:ty),*) => {$(
        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    )*};
}

display_id!(StatementId, DocumentId, StatementTypeId);

/// A coded statement: an actor taking a position on a concept, anchored
/// to a text span of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub id: StatementId,
    pub statement_type: StatementTypeId,
    pub document: DocumentId,
    /// Character offset where the coded span starts, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    /// Character offset where the coded span ends, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<usize>,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub values: VariableMap,
}

impl Statement {
    pub fn new(
        id: StatementId,
        statement_type: StatementTypeId,
        document: DocumentId,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            statement_type,
            document,
            start: None,
            stop: None,
            date,
            values: VariableMap::new(),
        }
    }

    pub fn with_span(mut self, start: usize, stop: usize) -> Self {
        self.start = Some(start);
        self.stop = Some(stop);
        self
    }

    pub fn with_value(mut self, variable: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(variable.into(), value.into());
        self
    }

    pub fn get(&self, variable: &str) -> Option<&Value> {
        self.values.get(variable)
    }

    /// Identity used to detect a statement that was imported twice.
    ///
    /// `None` when the statement carries no complete span; such statements
    /// are never considered duplicates of one another.
    pub fn span_key(&self) -> Option<(StatementTypeId, DocumentId, usize, usize)> {
        Some((self.statement_type, self.document, self.start?, self.stop?))
    }
}

/// A source document statements are coded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub title: String,
    pub date: NaiveDateTime,
}

impl Document {
    pub fn new(id: DocumentId, title: impl Into<String>, date: NaiveDateTime) -> Self {
        Self { id, title: title.into(), date }
    }
}
