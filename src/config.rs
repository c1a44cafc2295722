//! Export configuration files.
//!
//! An export can be described in TOML instead of (or in addition to)
//! command-line flags:
//!
//! ```toml
//! statement_type = "DNA Statement"
//! mode1 = "person"
//! mode2 = "concept"
//! network_type = "one-mode"
//! start = "2020-01-01"
//! end = "2021-12-31"
//! format = "graphml"
//! output = "networks.graphml"
//!
//! [agreement]
//! variable = "agreement"
//! pattern = "subtract"
//!
//! [exclude]
//! mode1 = ["Anonymous"]
//!
//! [aggregation]
//! rule = "time-window"
//! days = 90
//! ```

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::engine::EngineOptions;
use crate::export::OutputFormat;
use crate::model::{NetworkType, StatementType, Value};
use crate::spec::{AgreementPattern, AggregationRule, ConfigError, DateRange, NetworkSpec};
use crate::Result;

pub const DEFAULT_STATEMENT_TYPE: &str = "DNA Statement";
pub const DEFAULT_MODE1: &str = "person";
pub const DEFAULT_MODE2: &str = "concept";

/// Export settings as read from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub statement_type: String,
    pub mode1: String,
    pub mode2: String,
    pub network_type: NetworkType,
    pub agreement: AgreementConfig,
    pub exclude: ExcludeConfig,
    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`. Defaults to the first statement.
    pub start: Option<String>,
    /// `YYYY-MM-DD` (end of that day) or a full timestamp. Defaults to the last statement.
    pub end: Option<String>,
    pub aggregation: AggregationRule,
    pub isolates: bool,
    pub deduplicate: bool,
    /// Defaults to the output file's extension, then CSV.
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgreementConfig {
    pub variable: Option<String>,
    pub values: Vec<Value>,
    pub pattern: AgreementPattern,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcludeConfig {
    pub mode1: Vec<String>,
    pub mode2: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            statement_type: DEFAULT_STATEMENT_TYPE.into(),
            mode1: DEFAULT_MODE1.into(),
            mode2: DEFAULT_MODE2.into(),
            network_type: NetworkType::TwoMode,
            agreement: AgreementConfig::default(),
            exclude: ExcludeConfig::default(),
            start: None,
            end: None,
            aggregation: AggregationRule::default(),
            isolates: false,
            deduplicate: true,
            format: None,
            output: None,
        }
    }
}

impl ExportConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Format to write, falling back to the output extension, then CSV.
    pub fn output_format(&self) -> OutputFormat {
        self.format
            .or_else(|| self.output.as_deref().and_then(OutputFormat::from_path))
            .unwrap_or_default()
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions { deduplicate: self.deduplicate }
    }

    /// Resolve the date range, filling open ends from the store's bounds.
    pub fn date_range(&self, bounds: Option<DateRange>) -> std::result::Result<DateRange, ConfigError> {
        let start = match &self.start {
            Some(s) => parse_date(s, "start", false)?,
            None => bounds.map(|b| b.start).unwrap_or(NaiveDateTime::MIN),
        };
        let end = match &self.end {
            Some(s) => parse_date(s, "end", true)?,
            None => bounds.map(|b| b.end).unwrap_or(NaiveDateTime::MAX),
        };
        DateRange::new(start, end)
    }

    /// Build the network spec for `schema`. The spec still has to be
    /// validated against the schema before use.
    pub fn to_spec(
        &self,
        schema: &StatementType,
        bounds: Option<DateRange>,
    ) -> std::result::Result<NetworkSpec, ConfigError> {
        let mut spec = NetworkSpec::new(schema.id, &self.mode1, &self.mode2, self.date_range(bounds)?)
            .with_network_type(self.network_type)
            .with_pattern(self.agreement.pattern)
            .excluding_mode1(self.exclude.mode1.iter().cloned())
            .excluding_mode2(self.exclude.mode2.iter().cloned())
            .aggregated_by(self.aggregation)
            .with_isolates(self.isolates);
        spec.agreement_variable = self.agreement.variable.clone();
        spec.agreement_values = self.agreement.values.clone();
        Ok(spec)
    }
}

/// Parse a date or timestamp. Bare dates of an `end` bound cover the whole day.
pub fn parse_date(s: &str, field: &str, end_of_day: bool) -> std::result::Result<NaiveDateTime, ConfigError> {
    let s = s.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    let invalid = || ConfigError::Invalid {
        field: field.to_owned(),
        message: format!("'{s}' is not a date (YYYY-MM-DD) or timestamp (YYYY-MM-DDTHH:MM:SS)"),
    };
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())?;
    let time = if end_of_day { date.and_hms_opt(23, 59, 59) } else { date.and_hms_opt(0, 0, 0) };
    time.ok_or_else(invalid)
}
