//! VariableMap — the variable values carried by a statement.

use std::collections::HashMap;
use super::Value;

/// A map of variable names to values.
///
/// Iteration order is not meaningful; the owning statement type's schema
/// gives the declared variable order.
pub type VariableMap = HashMap<String, Value>;
