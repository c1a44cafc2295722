//! Tagged variable values and the kinds a statement type declares for them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared data kind of a statement-type variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableKind {
    ShortText,
    LongText,
    Boolean,
    Integer,
}

impl VariableKind {
    pub fn name(&self) -> &'static str {
        match self {
            VariableKind::ShortText => "short-text",
            VariableKind::LongText => "long-text",
            VariableKind::Boolean => "boolean",
            VariableKind::Integer => "integer",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, VariableKind::ShortText | VariableKind::LongText)
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single variable value on a statement.
///
/// Serialized untagged so that snapshots read naturally:
/// `"EPA"`, `true`, `1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

/// A value could not be read under the kind its variable declares.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected} value, got {got}")]
pub struct KindMismatch {
    pub expected: VariableKind,
    pub got: &'static str,
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::Text(_) => "TEXT",
        }
    }

    pub fn is_text(&self) -> bool { matches!(self, Value::Text(_)) }

    /// Empty text never becomes a node label.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Booleans are persisted as 0/1, so both encodings are accepted.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(0) => Some(false),
            Value::Integer(1) => Some(true),
            _ => None,
        }
    }

    /// Interpret this value under a declared kind, normalizing the
    /// 0/1 boolean encoding to `Value::Boolean`.
    pub fn coerce(&self, kind: VariableKind) -> Result<Value, KindMismatch> {
        let mismatch = || KindMismatch { expected: kind, got: self.type_name() };
        match kind {
            VariableKind::Boolean => self.as_bool().map(Value::Boolean).ok_or_else(mismatch),
            VariableKind::Integer => self.as_int().map(Value::Integer).ok_or_else(mismatch),
            VariableKind::ShortText | VariableKind::LongText => match self {
                Value::Text(_) => Ok(self.clone()),
                _ => Err(mismatch()),
            },
        }
    }

    /// Node label rendering of this value.
    pub fn label(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Boolean(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Integer(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Integer(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::Text(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::Text(v.to_owned()) } }

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", u8::from(*b)),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}
