//! Network specifications: what to project, over which dates, sliced how.
//!
//! A [`NetworkSpec`] is assembled per export request by the caller. It must
//! be checked against the statement type's schema with
//! [`NetworkSpec::validate`] before any statement is read; the filter,
//! aggregator and builder only accept the resulting [`ValidSpec`].

use std::collections::HashSet;
use std::ops::Deref;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::model::{NetworkType, StatementType, StatementTypeId, Value, VariableKind};

// ============================================================================
// Enumerations
// ============================================================================

/// How agreement values of two statements about the same concept are weighed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgreementPattern {
    /// Count pairs with equal agreement values.
    #[default]
    Congruence,
    /// Count pairs with differing agreement values.
    Conflict,
    /// Congruence minus conflict.
    Subtract,
    /// Congruence and conflict as two parallel layers.
    Separate,
}

/// Policy for splitting the filtered statements into time slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum AggregationRule {
    #[default]
    WholeRange,
    PerDocument,
    PerYear,
    TimeWindow { days: u32 },
}

// ============================================================================
// DateRange
// ============================================================================

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvertedDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The whole calendar years `from..=to`.
    pub fn years(from: i32, to: i32) -> Result<Self, ConfigError> {
        let start = chrono::NaiveDate::from_yo_opt(from, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or(ConfigError::YearOutOfRange(from))?;
        let end = chrono::NaiveDate::from_ymd_opt(to, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .ok_or(ConfigError::YearOutOfRange(to))?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: &NaiveDateTime) -> bool {
        *date >= self.start && *date <= self.end
    }

    /// Smallest range covering every date, if any.
    pub fn spanning<'a>(dates: impl IntoIterator<Item = &'a NaiveDateTime>) -> Option<Self> {
        let mut iter = dates.into_iter();
        let first = *iter.next()?;
        let (start, end) = iter.fold((first, first), |(lo, hi), d| (lo.min(*d), hi.max(*d)));
        Some(Self { start, end })
    }
}

// ============================================================================
// Configuration errors
// ============================================================================

/// A network specification that cannot be executed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown statement type: {0}")]
    UnknownStatementType(String),

    #[error("statement type '{statement_type}' has no variable '{variable}'")]
    UnknownVariable { statement_type: String, variable: String },

    #[error("mode-1 and mode-2 must be different variables, both are '{0}'")]
    SameModeVariable(String),

    #[error("a one-mode network needs an agreement variable")]
    MissingAgreementVariable,

    #[error("agreement values are restricted but no agreement variable is set")]
    AgreementValuesWithoutVariable,

    #[error("agreement value {value} is not a valid {kind} value")]
    AgreementValue { value: String, kind: VariableKind },

    #[error("date range starts at {start} after it ends at {end}")]
    InvertedDateRange { start: NaiveDateTime, end: NaiveDateTime },

    #[error("year {0} is out of range")]
    YearOutOfRange(i32),

    #[error("time window must span at least one day")]
    EmptyTimeWindow,

    #[error("spec is for statement type {expected}, schema given is {got}")]
    StatementTypeMismatch { expected: StatementTypeId, got: StatementTypeId },

    #[error("invalid setting '{field}': {message}")]
    Invalid { field: String, message: String },
}

// ============================================================================
// NetworkSpec
// ============================================================================

/// Everything the engine needs to derive networks from a statement type.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSpec {
    pub statement_type: StatementTypeId,
    /// Variable whose values become mode-1 (row) nodes.
    pub mode1: String,
    /// Variable whose values become mode-2 (column) nodes.
    pub mode2: String,
    pub network_type: NetworkType,
    pub agreement_variable: Option<String>,
    /// Agreement values the analysis is restricted to. Empty means all.
    pub agreement_values: Vec<Value>,
    pub agreement_pattern: AgreementPattern,
    pub exclude_mode1: HashSet<String>,
    pub exclude_mode2: HashSet<String>,
    pub date_range: DateRange,
    pub aggregation: AggregationRule,
    /// Keep every node of the whole filtered set in every slice.
    pub isolates: bool,
}

impl NetworkSpec {
    /// A two-mode, whole-range spec with no agreement handling.
    pub fn new(
        statement_type: StatementTypeId,
        mode1: impl Into<String>,
        mode2: impl Into<String>,
        date_range: DateRange,
    ) -> Self {
        Self {
            statement_type,
            mode1: mode1.into(),
            mode2: mode2.into(),
            network_type: NetworkType::TwoMode,
            agreement_variable: None,
            agreement_values: Vec::new(),
            agreement_pattern: AgreementPattern::default(),
            exclude_mode1: HashSet::new(),
            exclude_mode2: HashSet::new(),
            date_range,
            aggregation: AggregationRule::default(),
            isolates: false,
        }
    }

    pub fn one_mode(mut self, agreement_variable: impl Into<String>, pattern: AgreementPattern) -> Self {
        self.network_type = NetworkType::OneMode;
        self.agreement_variable = Some(agreement_variable.into());
        self.agreement_pattern = pattern;
        self
    }

    pub fn with_network_type(mut self, network_type: NetworkType) -> Self {
        self.network_type = network_type;
        self
    }

    pub fn with_agreement(mut self, variable: impl Into<String>, values: Vec<Value>) -> Self {
        self.agreement_variable = Some(variable.into());
        self.agreement_values = values;
        self
    }

    pub fn with_pattern(mut self, pattern: AgreementPattern) -> Self {
        self.agreement_pattern = pattern;
        self
    }

    pub fn excluding_mode1(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude_mode1.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn excluding_mode2(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude_mode2.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn aggregated_by(mut self, rule: AggregationRule) -> Self {
        self.aggregation = rule;
        self
    }

    pub fn with_isolates(mut self, isolates: bool) -> Self {
        self.isolates = isolates;
        self
    }

    /// Check the spec against the schema of its statement type.
    pub fn validate(&self, schema: &StatementType) -> Result<ValidSpec, ConfigError> {
        if schema.id != self.statement_type {
            return Err(ConfigError::StatementTypeMismatch {
                expected: self.statement_type,
                got: schema.id,
            });
        }

        let unknown = |variable: &str| ConfigError::UnknownVariable {
            statement_type: schema.name.clone(),
            variable: variable.to_owned(),
        };
        let mode1_kind = schema.kind_of(&self.mode1).ok_or_else(|| unknown(&self.mode1))?;
        let mode2_kind = schema.kind_of(&self.mode2).ok_or_else(|| unknown(&self.mode2))?;
        if self.mode1 == self.mode2 {
            return Err(ConfigError::SameModeVariable(self.mode1.clone()));
        }

        if self.date_range.start > self.date_range.end {
            return Err(ConfigError::InvertedDateRange {
                start: self.date_range.start,
                end: self.date_range.end,
            });
        }
        if let AggregationRule::TimeWindow { days: 0 } = self.aggregation {
            return Err(ConfigError::EmptyTimeWindow);
        }

        let mut spec = self.clone();
        let agreement_kind = match &self.agreement_variable {
            None => {
                if self.network_type == NetworkType::OneMode {
                    return Err(ConfigError::MissingAgreementVariable);
                }
                if !self.agreement_values.is_empty() {
                    return Err(ConfigError::AgreementValuesWithoutVariable);
                }
                None
            }
            Some(variable) => {
                let kind = schema.kind_of(variable).ok_or_else(|| unknown(variable))?;
                spec.agreement_values = self
                    .agreement_values
                    .iter()
                    .map(|v| {
                        v.coerce(kind).map_err(|_| ConfigError::AgreementValue {
                            value: v.to_string(),
                            kind,
                        })
                    })
                    .collect::<Result<_, _>>()?;
                Some(kind)
            }
        };

        Ok(ValidSpec { spec, mode1_kind, mode2_kind, agreement_kind })
    }
}

// ============================================================================
// ValidSpec
// ============================================================================

/// A spec that passed schema validation, with the declared variable kinds
/// resolved and restricted agreement values normalized to those kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSpec {
    spec: NetworkSpec,
    mode1_kind: VariableKind,
    mode2_kind: VariableKind,
    agreement_kind: Option<VariableKind>,
}

impl ValidSpec {
    pub fn mode1_kind(&self) -> VariableKind {
        self.mode1_kind
    }

    pub fn mode2_kind(&self) -> VariableKind {
        self.mode2_kind
    }

    /// The agreement variable and its declared kind, when one is set.
    pub fn agreement(&self) -> Option<(&str, VariableKind)> {
        self.spec.agreement_variable.as_deref().zip(self.agreement_kind)
    }

    /// Length of one aggregation window, if windowed.
    pub fn window(&self) -> Option<TimeDelta> {
        match self.spec.aggregation {
            AggregationRule::TimeWindow { days } => Some(TimeDelta::days(i64::from(days))),
            _ => None,
        }
    }

    pub fn into_inner(self) -> NetworkSpec {
        self.spec
    }
}

impl Deref for ValidSpec {
    type Target = NetworkSpec;

    fn deref(&self) -> &NetworkSpec {
        &self.spec
    }
}
