//! Engine configuration: every heuristic constant in one versioned table.
//!
//! All sections deserialize with defaults, so a `prepcast.toml` only needs to
//! name the constants it overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::FoundationStrength;
use crate::probability::{default_bands, validate_bands, ProbabilityBand};
use crate::rank_table::{RankTable, RankTableSet};

/// Version tag of the built-in constant set.
pub const CONFIG_VERSION: &str = "2025.1";

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub version: String,
    /// Exam year used when a profile names none.
    pub default_exam_year: Option<u16>,
    pub defaults: TelemetryDefaults,
    pub scoring: ScoringConfig,
    pub baseline: BaselineConfig,
    pub improvement: ImprovementConfig,
    pub biological: BiologicalConfig,
    pub stress: StressConfig,
    pub mistakes: MistakeConfig,
    pub confidence: ConfidenceConfig,
    pub advisor: AdvisorConfig,
    pub probability_bands: Vec<ProbabilityBand>,
    pub rank_tables: Vec<RankTable>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            default_exam_year: None,
            defaults: TelemetryDefaults::default(),
            scoring: ScoringConfig::default(),
            baseline: BaselineConfig::default(),
            improvement: ImprovementConfig::default(),
            biological: BiologicalConfig::default(),
            stress: StressConfig::default(),
            mistakes: MistakeConfig::default(),
            confidence: ConfidenceConfig::default(),
            advisor: AdvisorConfig::default(),
            probability_bands: default_bands(),
            rank_tables: vec![RankTable::builtin_2025()],
        }
    }
}

/// Values substituted for absent telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryDefaults {
    pub consistency_score: f64,
    pub current_best: f64,
    pub energy: f64,
    pub stress: f64,
}

impl Default for TelemetryDefaults {
    fn default() -> Self {
        Self {
            consistency_score: 85.0,
            current_best: 640.0,
            energy: 7.0,
            stress: 5.5,
        }
    }
}

/// Score domain limits and synthesis constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub max_score: u16,
    /// Lowest most-likely score the engine reports.
    pub min_floor: u16,
    /// Lowest worst-case score the engine reports.
    pub absolute_min: u16,
    /// Distance from most-likely to best and worst case.
    pub case_margin: u16,
    /// Half-width of the confidence range.
    pub confidence_spread: u16,
    pub platform_synergy_bonus: f64,
    pub structured_practice_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_score: 720,
            min_floor: 600,
            absolute_min: 0,
            case_margin: 25,
            confidence_spread: 15,
            platform_synergy_bonus: 5.0,
            structured_practice_bonus: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    pub coaching_coefficient: f64,
    pub foundation_strong: f64,
    pub foundation_good: f64,
    pub foundation_average: f64,
    pub foundation_weak: f64,
}

impl BaselineConfig {
    pub fn foundation_coefficient(&self, foundation: FoundationStrength) -> f64 {
        match foundation {
            FoundationStrength::Strong => self.foundation_strong,
            FoundationStrength::Good => self.foundation_good,
            FoundationStrength::Average => self.foundation_average,
            FoundationStrength::Weak => self.foundation_weak,
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            coaching_coefficient: 1.05,
            foundation_strong: 1.08,
            foundation_good: 1.04,
            foundation_average: 1.0,
            foundation_weak: 0.94,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImprovementConfig {
    /// Upper bound on the improvement term.
    pub max_improvement: f64,
    /// Improvement allowed even when the target is already reached.
    pub min_headroom: f64,
    pub volume_bonus: f64,
    pub mistake_elimination_full: f64,
    pub mistake_elimination_partial: f64,
    /// Unresolved critical mistakes at which elimination earns nothing.
    pub unresolved_critical_cutoff: u32,
    pub consistency_high_threshold: f64,
    pub consistency_bonus_high: f64,
    pub consistency_mid_threshold: f64,
    pub consistency_bonus_mid: f64,
    pub consistency_bonus_base: f64,
    pub platform_bonus: f64,
    pub engagement_bonus: f64,
    pub engagement_multiplier: f64,
    /// Largest positive trend (percent) that still raises the multiplier.
    pub trend_cap: f64,
}

impl Default for ImprovementConfig {
    fn default() -> Self {
        Self {
            max_improvement: 200.0,
            min_headroom: 20.0,
            volume_bonus: 15.0,
            mistake_elimination_full: 25.0,
            mistake_elimination_partial: 12.0,
            unresolved_critical_cutoff: 2,
            consistency_high_threshold: 90.0,
            consistency_bonus_high: 20.0,
            consistency_mid_threshold: 80.0,
            consistency_bonus_mid: 12.0,
            consistency_bonus_base: 5.0,
            platform_bonus: 10.0,
            engagement_bonus: 8.0,
            engagement_multiplier: 1.10,
            trend_cap: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiologicalConfig {
    pub energy_peak_above: f64,
    pub energy_peak_bonus: f64,
    pub energy_high_above: f64,
    pub energy_high_bonus: f64,
    pub energy_fair_above: f64,
    pub energy_fair_bonus: f64,
    pub low_energy_penalty: f64,
    pub cycle_awareness_bonus: f64,
    pub time_of_day_bonus: f64,
    pub nutrition_fitness_bonus: f64,
}

impl Default for BiologicalConfig {
    fn default() -> Self {
        Self {
            energy_peak_above: 8.0,
            energy_peak_bonus: 15.0,
            energy_high_above: 7.0,
            energy_high_bonus: 10.0,
            energy_fair_above: 6.0,
            energy_fair_bonus: 5.0,
            low_energy_penalty: -10.0,
            cycle_awareness_bonus: 4.0,
            time_of_day_bonus: 4.0,
            nutrition_fitness_bonus: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub calm_below: f64,
    pub calm_bonus: f64,
    pub steady_below: f64,
    pub steady_bonus: f64,
    pub elevated_below: f64,
    pub elevated_bonus: f64,
    pub high_stress_penalty: f64,
    pub attempt_experience_bonus: f64,
    pub panic_free_bonus: f64,
    pub family_support_low: f64,
    pub family_support_moderate: f64,
    pub family_support_high: f64,
    pub trend_confidence_bonus: f64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            calm_below: 5.0,
            calm_bonus: 10.0,
            steady_below: 6.0,
            steady_bonus: 5.0,
            elevated_below: 7.0,
            elevated_bonus: 0.0,
            high_stress_penalty: -12.0,
            attempt_experience_bonus: 4.0,
            panic_free_bonus: 4.0,
            family_support_low: 5.0,
            family_support_moderate: 2.0,
            family_support_high: 0.0,
            trend_confidence_bonus: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MistakeConfig {
    /// Adjustment used when no mistake telemetry exists at all.
    pub no_data_default: f64,
    pub critical_clear_bonus: f64,
    pub critical_partial_bonus: f64,
    /// Unresolved critical mistakes at which the critical term is zero.
    pub critical_cutoff: u32,
    pub moderate_clear_bonus: f64,
    pub moderate_partial_bonus: f64,
    /// Highest moderate count that still earns the partial bonus.
    pub moderate_partial_max: u32,
    pub pattern_recognition_bonus: f64,
    pub adaptive_difficulty_bonus: f64,
}

impl Default for MistakeConfig {
    fn default() -> Self {
        Self {
            no_data_default: 12.0,
            critical_clear_bonus: 20.0,
            critical_partial_bonus: 10.0,
            critical_cutoff: 2,
            moderate_clear_bonus: 10.0,
            moderate_partial_bonus: 5.0,
            moderate_partial_max: 3,
            pattern_recognition_bonus: 4.0,
            adaptive_difficulty_bonus: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub base: u8,
    pub max: u8,
    pub telemetry_increment: u8,
    pub consistency_threshold: f64,
    pub consistency_increment: u8,
    pub test_data_increment: u8,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base: 85,
            max: 97,
            telemetry_increment: 4,
            consistency_threshold: 75.0,
            consistency_increment: 4,
            test_data_increment: 4,
        }
    }
}

/// One roadmap horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonConfig {
    pub days: u16,
    /// Fractional increase applied to daily question volume.
    pub question_step: f64,
    /// Share of the remaining gap to target closed by this horizon.
    pub gap_fraction: f64,
}

/// Share of daily questions per subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectShares {
    pub physics: f64,
    pub chemistry: f64,
    pub biology: f64,
}

impl Default for SubjectShares {
    fn default() -> Self {
        Self {
            physics: 0.25,
            chemistry: 0.25,
            biology: 0.5,
        }
    }
}

/// Risks and mitigations that apply to every candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeededRisks {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
    pub mitigations: Vec<String>,
}

impl Default for SeededRisks {
    fn default() -> Self {
        Self {
            high: vec!["Negative marking from guesswork on uncertain questions".into()],
            medium: vec!["Time pressure on lengthy physics numericals".into()],
            low: vec!["Unfamiliar exam-centre environment".into()],
            mitigations: vec![
                "Attempt only questions you can eliminate to two options or fewer".into(),
                "Practise full papers under a strict 180-minute timer".into(),
                "Visit the exam centre or a similar hall before exam day".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub strong_consistency: f64,
    pub weak_consistency: f64,
    pub healthy_energy: f64,
    pub low_energy: f64,
    pub high_stress: f64,
    pub critical_mistake_risk: u32,
    pub moderate_mistake_risk: u32,
    pub recommended_sleep_hours: f64,
    pub next_30_days: HorizonConfig,
    pub next_90_days: HorizonConfig,
    pub final_180_days: HorizonConfig,
    pub subject_shares: SubjectShares,
    pub seeded_risks: SeededRisks,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            strong_consistency: 80.0,
            weak_consistency: 60.0,
            healthy_energy: 7.0,
            low_energy: 5.0,
            high_stress: 7.0,
            critical_mistake_risk: 2,
            moderate_mistake_risk: 3,
            recommended_sleep_hours: 7.0,
            next_30_days: HorizonConfig {
                days: 30,
                question_step: 0.10,
                gap_fraction: 0.3,
            },
            next_90_days: HorizonConfig {
                days: 90,
                question_step: 0.25,
                gap_fraction: 0.7,
            },
            final_180_days: HorizonConfig {
                days: 180,
                question_step: 0.40,
                gap_fraction: 1.0,
            },
            subject_shares: SubjectShares::default(),
            seeded_risks: SeededRisks::default(),
        }
    }
}

impl EngineConfig {
    /// Check every cross-field constraint and build the rank table set.
    pub fn validate(&self) -> Result<RankTableSet, ConfigError> {
        let scoring = &self.scoring;
        if scoring.max_score == 0 {
            return Err(setting("scoring", "max_score must be positive"));
        }
        if scoring.min_floor > scoring.max_score {
            return Err(setting(
                "scoring",
                format!(
                    "min_floor {} exceeds max_score {}",
                    scoring.min_floor, scoring.max_score
                ),
            ));
        }
        if scoring.absolute_min > scoring.min_floor {
            return Err(setting(
                "scoring",
                format!(
                    "absolute_min {} exceeds min_floor {}",
                    scoring.absolute_min, scoring.min_floor
                ),
            ));
        }

        let confidence = &self.confidence;
        if confidence.base > confidence.max || confidence.max > 100 {
            return Err(setting(
                "confidence",
                format!(
                    "need base <= max <= 100, got base {} and max {}",
                    confidence.base, confidence.max
                ),
            ));
        }

        if !(0.0..=100.0).contains(&self.defaults.consistency_score)
            || !(1.0..=10.0).contains(&self.defaults.energy)
            || !(1.0..=10.0).contains(&self.defaults.stress)
        {
            return Err(setting("defaults", "telemetry defaults lie outside their domains"));
        }

        if self.improvement.max_improvement < 0.0 || self.improvement.min_headroom < 0.0 {
            return Err(setting("improvement", "caps must be non-negative"));
        }

        for horizon in [
            &self.advisor.next_30_days,
            &self.advisor.next_90_days,
            &self.advisor.final_180_days,
        ] {
            if !(0.0..=1.0).contains(&horizon.gap_fraction) || horizon.question_step < 0.0 {
                return Err(setting(
                    "advisor",
                    format!("horizon of {} days has an invalid step", horizon.days),
                ));
            }
        }
        let shares = &self.advisor.subject_shares;
        if [shares.physics, shares.chemistry, shares.biology]
            .iter()
            .any(|s| !s.is_finite() || *s < 0.0)
        {
            return Err(setting("advisor", "subject shares must be non-negative"));
        }

        validate_bands(&self.probability_bands)?;
        RankTableSet::new(self.rank_tables.clone())
    }
}

fn setting(section: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Setting {
        section,
        reason: reason.into(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `prepcast.toml` in the current directory
/// 2. `~/.config/prepcast/config.toml`
///
/// `PREPCAST_EXAM_YEAR` overrides `default_exam_year`.
pub fn load_config() -> Result<EngineConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EngineConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("prepcast.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded engine config from {}", path.display());
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Ok(year) = std::env::var("PREPCAST_EXAM_YEAR") {
        let year = year
            .trim()
            .parse::<u16>()
            .with_context(|| format!("PREPCAST_EXAM_YEAR must be a year, got '{year}'"))?;
        config.default_exam_year = Some(year);
    }

    Ok(config)
}

/// Parse a TOML config document.
pub fn parse_config_str(content: &str) -> Result<EngineConfig> {
    Ok(toml::from_str::<EngineConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("prepcast"))
}
