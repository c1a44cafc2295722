//! # discourse-net — Discourse Network Construction
//!
//! Turns coded statements ("actor X takes position Y on concept Z, in
//! document D, on date T") into networks for social-network analysis:
//! two-mode actor × concept networks, or one-mode actor × actor networks
//! weighted by agreement, optionally sliced over time.
//!
//! ## Design Principles
//!
//! 1. **Trait at the boundary**: `StatementStore` is the only way statements come in
//! 2. **Clean DTOs**: `Statement`, `Value`, `Network` cross every stage
//! 3. **Validate first**: a `NetworkSpec` becomes a `ValidSpec` before any statement is read
//! 4. **Pure core**: filter → aggregate → build is a function of (snapshot, spec)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use discourse_net::{
//!     AgreementPattern, AggregationRule, DateRange, EngineOptions, ExportControl,
//!     MemoryStore, NetworkSpec, StatementStore,
//! };
//!
//! # async fn example() -> discourse_net::Result<()> {
//! let store = MemoryStore::open_snapshot("corpus.json").await?;
//! let st = store.statement_type_by_name("DNA Statement").await?.unwrap();
//!
//! let spec = NetworkSpec::new(st.id, "person", "concept", DateRange::years(2020, 2021)?)
//!     .one_mode("agreement", AgreementPattern::Congruence)
//!     .aggregated_by(AggregationRule::PerYear);
//!
//! let control = ExportControl::new();
//! let outcome = discourse_net::engine::export(&store, &spec, EngineOptions::default(), &control).await?;
//! if let Some(result) = outcome.completed() {
//!     let mut out = Vec::new();
//!     discourse_net::export::write_networks(
//!         &result.networks,
//!         discourse_net::export::OutputFormat::Csv,
//!         &mut out,
//!     )?;
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod spec;
pub mod filter;
pub mod aggregate;
pub mod builder;
pub mod engine;
pub mod storage;
pub mod export;
pub mod config;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Statement, StatementId, StatementType, StatementTypeId, Document, DocumentId,
    Value, VariableKind, Network, NetworkType, NodeSet, Layer, LayerKind, SliceLabel, Weight,
};

// ============================================================================
// Re-exports: Spec & pipeline
// ============================================================================

pub use spec::{
    NetworkSpec, ValidSpec, AgreementPattern, AggregationRule, DateRange, ConfigError,
};
pub use filter::DataWarning;
pub use aggregate::TimeSlice;
pub use engine::{EngineOptions, ExportControl, ExportOutcome, ExportResult};

// ============================================================================
// Re-exports: Storage & export
// ============================================================================

pub use storage::{StatementStore, MemoryStore, Snapshot};
pub use export::OutputFormat;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
