//! Filter stage: selects the statements a network is built from.
//!
//! A statement is kept when it belongs to the spec's statement type, its
//! date lies in the inclusive date range, both node variables carry a
//! non-empty label outside the exclusion lists, and its agreement value
//! (when a restriction is set) is one of the allowed values. Input order
//! is preserved.

use serde::Serialize;

use crate::model::{Statement, StatementId, Value, VariableKind};
use crate::spec::ValidSpec;

/// A statement that was skipped because one of its values does not fit
/// the kind its variable declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataWarning {
    pub statement: StatementId,
    pub message: String,
}

/// Output of [`filter`].
#[derive(Debug, Clone, Default)]
pub struct Filtered<'a> {
    pub statements: Vec<&'a Statement>,
    pub warnings: Vec<DataWarning>,
}

/// Non-empty node label of a statement's variable, if it has one.
pub fn node_label(statement: &Statement, variable: &str) -> Option<String> {
    statement
        .get(variable)
        .map(Value::label)
        .filter(|label| !label.is_empty())
}

/// Agreement value of a statement normalized to the variable's kind.
pub fn agreement_value(
    statement: &Statement,
    variable: &str,
    kind: VariableKind,
) -> Result<Value, String> {
    let value = statement
        .get(variable)
        .ok_or_else(|| format!("no value for agreement variable '{variable}'"))?;
    value
        .coerce(kind)
        .map_err(|e| format!("agreement variable '{variable}': {e}"))
}

enum Verdict {
    Keep,
    Drop,
    Warn(String),
}

/// Run the filter stage over a statement snapshot.
pub fn filter<'a>(statements: &'a [Statement], spec: &ValidSpec) -> Filtered<'a> {
    let mut out = Filtered::default();
    for statement in statements {
        match check(statement, spec) {
            Verdict::Keep => out.statements.push(statement),
            Verdict::Drop => {}
            Verdict::Warn(message) => {
                tracing::warn!(statement = %statement.id, "skipping statement: {message}");
                out.warnings.push(DataWarning { statement: statement.id, message });
            }
        }
    }
    tracing::debug!(
        input = statements.len(),
        kept = out.statements.len(),
        skipped = out.warnings.len(),
        "filter stage done"
    );
    out
}

fn check(statement: &Statement, spec: &ValidSpec) -> Verdict {
    if statement.statement_type != spec.statement_type || !spec.date_range.contains(&statement.date) {
        return Verdict::Drop;
    }

    let modes = [
        (&spec.mode1, spec.mode1_kind(), &spec.exclude_mode1),
        (&spec.mode2, spec.mode2_kind(), &spec.exclude_mode2),
    ];
    for (variable, kind, excluded) in modes {
        let Some(value) = statement.get(variable) else {
            return Verdict::Drop;
        };
        if let Err(e) = value.coerce(kind) {
            return Verdict::Warn(format!("variable '{variable}': {e}"));
        }
        let label = value.label();
        if label.is_empty() || excluded.contains(&label) {
            return Verdict::Drop;
        }
    }

    if let Some((variable, kind)) = spec.agreement() {
        let value = match agreement_value(statement, variable, kind) {
            Ok(v) => v,
            Err(message) => return Verdict::Warn(message),
        };
        if !spec.agreement_values.is_empty() && !spec.agreement_values.contains(&value) {
            return Verdict::Drop;
        }
    }

    Verdict::Keep
}
