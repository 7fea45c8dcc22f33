//! prepcast-core: Deterministic exam score, rank and admission forecasting.
//!
//! A candidate `Profile` and an optional `TelemetrySnapshot` flow through
//! five factor scorers, a score synthesizer, a rank table, probability bands,
//! a confidence estimator and a rule-based advisor. Every stage is a pure
//! function; all constants live in a versioned `EngineConfig`.

pub mod advisor;
pub mod confidence;
pub mod config;
pub mod engine;
pub mod error;
pub mod factors;
pub mod model;
pub mod narrative;
pub mod parser;
pub mod probability;
pub mod rank_table;
pub mod report;
pub mod synthesis;

pub use config::EngineConfig;
pub use engine::{predict, PredictionEngine, PredictionResult};
pub use error::{ConfigError, ValidationError};
pub use model::{Profile, ProfileRecord, TelemetrySnapshot};
