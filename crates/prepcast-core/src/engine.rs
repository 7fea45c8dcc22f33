//! Prediction assembler.
//!
//! `PredictionEngine` owns a validated configuration and composes every
//! stage into a single `PredictionResult`. It holds no mutable state, so a
//! single engine can serve any number of threads.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::advisor::{analyze, DetailedAnalysis, ImprovementRoadmap, RiskAssessment};
use crate::config::EngineConfig;
use crate::confidence::confidence_for;
use crate::error::{ConfigError, ValidationError};
use crate::factors::{compute_factors, FactorBreakdown};
use crate::model::{Profile, ProfileRecord, TelemetrySnapshot};
use crate::probability::{probabilities_for, ProbabilityBands};
use crate::rank_table::RankTableSet;
use crate::synthesis::{project_ranks, synthesize, RankPrediction, ScorePrediction};

/// The complete forecast for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Version of the constant table that produced this result.
    pub config_version: String,
    /// Year of the rank table used for projection.
    pub exam_year: u16,
    pub score: ScorePrediction,
    pub rank: RankPrediction,
    pub probabilities: ProbabilityBands,
    pub confidence_level: u8,
    pub factors: FactorBreakdown,
    pub analysis: DetailedAnalysis,
    pub roadmap: ImprovementRoadmap,
    pub risks: RiskAssessment,
}

/// A validated, immutable prediction pipeline.
#[derive(Debug, Clone)]
pub struct PredictionEngine {
    config: EngineConfig,
    tables: RankTableSet,
}

impl PredictionEngine {
    /// Validate `config` and build an engine from it.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let tables = config.validate()?;
        tracing::debug!(
            version = %config.version,
            years = ?tables.years().collect::<Vec<_>>(),
            "prediction engine ready"
        );
        Ok(Self { config, tables })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rank_tables(&self) -> &RankTableSet {
        &self.tables
    }

    /// Forecast for a profile and an optional telemetry snapshot.
    ///
    /// Fails only when the profile is invalid. Malformed telemetry values are
    /// dropped and replaced by defaults; a snapshot with nothing left is
    /// treated as absent.
    pub fn predict(
        &self,
        profile: &Profile,
        telemetry: Option<&TelemetrySnapshot>,
    ) -> Result<PredictionResult, ValidationError> {
        profile.validate()?;

        let cleaned = telemetry.map(TelemetrySnapshot::sanitized);
        let telemetry = cleaned.as_ref().filter(|t| !t.is_empty());
        if telemetry.is_none() {
            tracing::debug!("no usable telemetry, scoring from defaults");
        }

        let cfg = &self.config;
        let factors = compute_factors(profile, telemetry, cfg);
        let score = synthesize(&factors, &cfg.scoring);

        let table = self
            .tables
            .select(profile.target_exam_year.or(cfg.default_exam_year));
        tracing::debug!(year = table.year, "rank table selected");
        let rank = project_ranks(&score, table);

        let probabilities = probabilities_for(score.most_likely, &cfg.probability_bands);
        let confidence_level = confidence_for(telemetry, &cfg.confidence);
        let (analysis, roadmap, risks) = analyze(profile, telemetry, &score, cfg);

        Ok(PredictionResult {
            config_version: cfg.version.clone(),
            exam_year: table.year,
            score,
            rank,
            probabilities,
            confidence_level,
            factors,
            analysis,
            roadmap,
            risks,
        })
    }

    /// Validate a loosely-typed record, then forecast.
    pub fn predict_record(
        &self,
        record: ProfileRecord,
        telemetry: Option<&TelemetrySnapshot>,
    ) -> Result<PredictionResult, ValidationError> {
        let profile = Profile::try_from(record)?;
        self.predict(&profile, telemetry)
    }
}

impl Default for PredictionEngine {
    /// Engine over the built-in constants. These are covered by a unit test
    /// and skip runtime validation.
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            tables: RankTableSet::default(),
        }
    }
}

/// Forecast with the built-in configuration.
pub fn predict(
    profile: &Profile,
    telemetry: Option<&TelemetrySnapshot>,
) -> Result<PredictionResult, ValidationError> {
    static DEFAULT_ENGINE: OnceLock<PredictionEngine> = OnceLock::new();
    DEFAULT_ENGINE
        .get_or_init(PredictionEngine::default)
        .predict(profile, telemetry)
}
