//! The five factor scorers.
//!
//! Each scorer is a pure function of the profile, the (sanitized) telemetry
//! and the engine config. None of them can fail: every telemetry value they
//! read has a configured default.

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, ImprovementConfig, MistakeConfig};
use crate::model::{PressureLevel, Profile, TelemetrySnapshot};

/// Telemetry with the configured defaults filled in.
///
/// Only the values shared by several scorers live here; scorers with
/// bespoke fallbacks read the snapshot directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    pub consistency: f64,
    pub current_best: f64,
    pub energy: f64,
    pub stress: f64,
    /// Positive part of the improvement trend, 0 when absent or falling.
    pub positive_trend: f64,
}

impl Signals {
    pub fn resolve(telemetry: Option<&TelemetrySnapshot>, config: &EngineConfig) -> Self {
        let defaults = &config.defaults;
        let t = telemetry;
        Self {
            consistency: t
                .and_then(|t| t.consistency_score)
                .unwrap_or(defaults.consistency_score),
            current_best: t
                .and_then(|t| t.best_test_score)
                .unwrap_or(defaults.current_best),
            energy: t.and_then(|t| t.avg_energy).unwrap_or(defaults.energy),
            stress: t.and_then(|t| t.avg_stress).unwrap_or(defaults.stress),
            positive_trend: t
                .and_then(|t| t.improvement_trend)
                .filter(|trend| *trend > 0.0)
                .unwrap_or(0.0),
        }
    }
}

/// Every factor value that went into a score, kept for audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub baseline: f64,
    pub improvement: f64,
    pub biological: f64,
    pub stress: f64,
    pub mistakes: f64,
    /// Fixed platform synergy and structured-practice bonuses.
    pub platform: f64,
}

impl FactorBreakdown {
    pub fn total(&self) -> f64 {
        self.baseline
            + self.improvement
            + self.biological
            + self.stress
            + self.mistakes
            + self.platform
    }
}

/// Run all five scorers.
pub fn compute_factors(
    profile: &Profile,
    telemetry: Option<&TelemetrySnapshot>,
    config: &EngineConfig,
) -> FactorBreakdown {
    let signals = Signals::resolve(telemetry, config);
    let breakdown = FactorBreakdown {
        baseline: performance_baseline(profile, telemetry, &signals, config),
        improvement: improvement_potential(profile, telemetry, &signals, &config.improvement),
        biological: biological_adjustment(profile, &signals, config),
        stress: stress_adjustment(profile, &signals, config),
        mistakes: mistake_adjustment(telemetry, &config.mistakes),
        platform: config.scoring.platform_synergy_bonus + config.scoring.structured_practice_bonus,
    };
    tracing::debug!(?breakdown, "factor scores computed");
    breakdown
}

/// Recent average (or mock midpoint) scaled by consistency, coaching,
/// foundation and a positive trend.
pub fn performance_baseline(
    profile: &Profile,
    telemetry: Option<&TelemetrySnapshot>,
    signals: &Signals,
    config: &EngineConfig,
) -> f64 {
    let base = telemetry
        .and_then(|t| t.avg_test_score)
        .unwrap_or_else(|| profile.mock_score_range.midpoint());

    let consistency_factor = signals.consistency / 100.0;
    let foundation = config.baseline.foundation_coefficient(profile.foundation);
    let trend = 1.0 + signals.positive_trend / 100.0;

    base * consistency_factor * config.baseline.coaching_coefficient * foundation * trend
}

/// Points still reachable before the exam, bounded by the remaining gap.
pub fn improvement_potential(
    profile: &Profile,
    telemetry: Option<&TelemetrySnapshot>,
    signals: &Signals,
    cfg: &ImprovementConfig,
) -> f64 {
    let elimination = match telemetry.and_then(|t| t.critical_mistakes) {
        Some(0) => cfg.mistake_elimination_full,
        Some(n) if n >= cfg.unresolved_critical_cutoff => 0.0,
        _ => cfg.mistake_elimination_partial,
    };

    let consistency = if signals.consistency >= cfg.consistency_high_threshold {
        cfg.consistency_bonus_high
    } else if signals.consistency >= cfg.consistency_mid_threshold {
        cfg.consistency_bonus_mid
    } else {
        cfg.consistency_bonus_base
    };

    let sum =
        cfg.volume_bonus + elimination + consistency + cfg.platform_bonus + cfg.engagement_bonus;

    let engagement = if signals.consistency >= cfg.consistency_mid_threshold {
        cfg.engagement_multiplier
    } else {
        1.0
    };
    let trend = 1.0 + signals.positive_trend.min(cfg.trend_cap) / 100.0;

    let gap = profile.target_score - signals.current_best;
    let cap = cfg.max_improvement.min(gap.max(cfg.min_headroom));

    (sum * engagement * trend).clamp(0.0, cap.max(0.0))
}

pub fn biological_adjustment(profile: &Profile, signals: &Signals, config: &EngineConfig) -> f64 {
    let cfg = &config.biological;
    let energy = if signals.energy > cfg.energy_peak_above {
        cfg.energy_peak_bonus
    } else if signals.energy > cfg.energy_high_above {
        cfg.energy_high_bonus
    } else if signals.energy > cfg.energy_fair_above {
        cfg.energy_fair_bonus
    } else {
        cfg.low_energy_penalty
    };

    let mut adjustment = energy;
    if !profile.low_energy_days.is_empty() {
        adjustment += cfg.cycle_awareness_bonus;
    }
    if !profile.best_time_slots.is_empty() {
        adjustment += cfg.time_of_day_bonus;
    }
    if profile.has_lifestyle_tag("nutrition") || profile.has_lifestyle_tag("fitness") {
        adjustment += cfg.nutrition_fitness_bonus;
    }
    adjustment
}

pub fn stress_adjustment(profile: &Profile, signals: &Signals, config: &EngineConfig) -> f64 {
    let cfg = &config.stress;
    let level = if signals.stress < cfg.calm_below {
        cfg.calm_bonus
    } else if signals.stress < cfg.steady_below {
        cfg.steady_bonus
    } else if signals.stress < cfg.elevated_below {
        cfg.elevated_bonus
    } else {
        cfg.high_stress_penalty
    };

    let mut adjustment = level;
    if profile.attempt_number > 1 {
        adjustment += cfg.attempt_experience_bonus;
    }
    let panics = profile
        .stress_triggers
        .iter()
        .any(|trigger| trigger.to_ascii_lowercase().contains("panic"));
    if !panics {
        adjustment += cfg.panic_free_bonus;
    }
    adjustment += match profile.family_pressure {
        PressureLevel::Low => cfg.family_support_low,
        PressureLevel::Moderate => cfg.family_support_moderate,
        PressureLevel::High => cfg.family_support_high,
    };
    if signals.positive_trend > 0.0 {
        adjustment += cfg.trend_confidence_bonus;
    }
    adjustment
}

pub fn mistake_adjustment(telemetry: Option<&TelemetrySnapshot>, cfg: &MistakeConfig) -> f64 {
    let critical = telemetry.and_then(|t| t.critical_mistakes);
    let moderate = telemetry.and_then(|t| t.moderate_mistakes);
    if critical.is_none() && moderate.is_none() {
        return cfg.no_data_default;
    }

    let critical_term = match critical {
        Some(0) => cfg.critical_clear_bonus,
        Some(n) if n < cfg.critical_cutoff => cfg.critical_partial_bonus,
        _ => 0.0,
    };
    let moderate_term = match moderate {
        Some(0) => cfg.moderate_clear_bonus,
        Some(n) if n <= cfg.moderate_partial_max => cfg.moderate_partial_bonus,
        _ => 0.0,
    };

    critical_term + moderate_term + cfg.pattern_recognition_bonus + cfg.adaptive_difficulty_bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{profile, telemetry};
    use crate::model::FoundationStrength;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn signals_fall_back_to_defaults() {
        let s = Signals::resolve(None, &config());
        assert_eq!(s.consistency, 85.0);
        assert_eq!(s.current_best, 640.0);
        assert_eq!(s.energy, 7.0);
        assert_eq!(s.stress, 5.5);
        assert_eq!(s.positive_trend, 0.0);
    }

    #[test]
    fn negative_trend_counts_as_zero() {
        let mut t = telemetry();
        t.improvement_trend = Some(-8.0);
        assert_eq!(Signals::resolve(Some(&t), &config()).positive_trend, 0.0);
    }

    #[test]
    fn baseline_without_telemetry_uses_mock_midpoint() {
        let cfg = config();
        let p = profile();
        let s = Signals::resolve(None, &cfg);
        let expected = 630.0 * 0.85 * 1.05 * 1.04;
        assert!(approx(performance_baseline(&p, None, &s, &cfg), expected));
    }

    #[test]
    fn baseline_applies_trend_and_foundation() {
        let cfg = config();
        let mut p = profile();
        p.foundation = FoundationStrength::Weak;
        let t = telemetry();
        let s = Signals::resolve(Some(&t), &cfg);
        let expected = 640.0 * 0.82 * 1.05 * 0.94 * 1.04;
        assert!(approx(performance_baseline(&p, Some(&t), &s, &cfg), expected));
    }

    #[test]
    fn improvement_is_capped_by_gap() {
        let cfg = config();
        let p = profile();
        let t = telemetry();
        let s = Signals::resolve(Some(&t), &cfg);
        // target 690, best 665: gap of 25 caps the much larger raw sum.
        assert_eq!(improvement_potential(&p, Some(&t), &s, &cfg.improvement), 25.0);
    }

    #[test]
    fn improvement_keeps_minimum_headroom_past_target() {
        let cfg = config();
        let mut p = profile();
        p.target_score = 600.0;
        let t = telemetry();
        let s = Signals::resolve(Some(&t), &cfg);
        assert_eq!(improvement_potential(&p, Some(&t), &s, &cfg.improvement), 20.0);
    }

    #[test]
    fn improvement_takes_top_tiers_with_clean_record() {
        let cfg = config();
        let mut p = profile();
        p.target_score = 720.0;
        let t = TelemetrySnapshot {
            best_test_score: Some(500.0),
            critical_mistakes: Some(0),
            consistency_score: Some(90.0),
            ..Default::default()
        };
        let s = Signals::resolve(Some(&t), &cfg);
        // (15 + 25 + 20 + 10 + 8) * 1.10
        let expected = 78.0 * 1.10;
        assert!(approx(
            improvement_potential(&p, Some(&t), &s, &cfg.improvement),
            expected
        ));
    }

    #[test]
    fn improvement_drops_elimination_bonus_past_cutoff() {
        let cfg = config();
        let mut p = profile();
        p.target_score = 720.0;
        let t = TelemetrySnapshot {
            best_test_score: Some(500.0),
            critical_mistakes: Some(2),
            consistency_score: Some(50.0),
            ..Default::default()
        };
        let s = Signals::resolve(Some(&t), &cfg);
        // 15 + 0 + 5 + 10 + 8, no multipliers.
        assert_eq!(improvement_potential(&p, Some(&t), &s, &cfg.improvement), 38.0);
    }

    #[test]
    fn improvement_never_exceeds_max() {
        let mut cfg = config();
        cfg.improvement.volume_bonus = 500.0;
        let mut p = profile();
        p.target_score = 720.0;
        let t = TelemetrySnapshot {
            best_test_score: Some(100.0),
            ..Default::default()
        };
        let s = Signals::resolve(Some(&t), &cfg);
        assert_eq!(improvement_potential(&p, Some(&t), &s, &cfg.improvement), 200.0);
    }

    #[test]
    fn biological_energy_bands() {
        let cfg = config();
        let mut p = profile();
        p.low_energy_days.clear();
        p.best_time_slots.clear();
        p.lifestyle_tags.clear();

        let at = |energy: f64| {
            let s = Signals {
                energy,
                ..Signals::resolve(None, &cfg)
            };
            biological_adjustment(&p, &s, &cfg)
        };
        assert_eq!(at(9.0), 15.0);
        assert_eq!(at(8.0), 10.0);
        assert_eq!(at(7.0), 5.0);
        assert_eq!(at(6.0), -10.0);
    }

    #[test]
    fn biological_tag_bonuses_stack() {
        let cfg = config();
        let p = profile();
        let s = Signals::resolve(Some(&telemetry()), &cfg);
        // energy 7.5 -> 10, plus cycle 4, time-of-day 4, nutrition 3
        assert_eq!(biological_adjustment(&p, &s, &cfg), 21.0);
    }

    #[test]
    fn stress_adjustment_combines_terms() {
        let cfg = config();
        let p = profile();
        let s = Signals::resolve(Some(&telemetry()), &cfg);
        // stress 5.5 -> 5, attempt 4, panic-free 4, moderate family 2, trend 3
        assert_eq!(stress_adjustment(&p, &s, &cfg), 18.0);
    }

    #[test]
    fn panic_trigger_and_high_stress() {
        let cfg = config();
        let mut p = profile();
        p.attempt_number = 1;
        p.stress_triggers = vec!["Panic attacks in mocks".into()];
        p.family_pressure = PressureLevel::High;
        let s = Signals {
            stress: 8.0,
            ..Signals::resolve(None, &cfg)
        };
        assert_eq!(stress_adjustment(&p, &s, &cfg), -12.0);
    }

    #[test]
    fn mistakes_without_data_use_default() {
        let cfg = config();
        assert_eq!(mistake_adjustment(None, &cfg.mistakes), 12.0);
        let t = TelemetrySnapshot {
            avg_energy: Some(7.0),
            ..Default::default()
        };
        assert_eq!(mistake_adjustment(Some(&t), &cfg.mistakes), 12.0);
    }

    #[test]
    fn clean_mistake_record_earns_top_tier() {
        let cfg = config();
        let t = TelemetrySnapshot {
            critical_mistakes: Some(0),
            moderate_mistakes: Some(0),
            consistency_score: Some(90.0),
            ..Default::default()
        };
        assert_eq!(mistake_adjustment(Some(&t), &cfg.mistakes), 20.0 + 10.0 + 4.0 + 3.0);
    }

    #[test]
    fn three_critical_mistakes_leave_only_fixed_bonuses() {
        let cfg = config();
        let t = TelemetrySnapshot {
            critical_mistakes: Some(3),
            ..Default::default()
        };
        assert_eq!(
            mistake_adjustment(Some(&t), &cfg.mistakes),
            cfg.mistakes.pattern_recognition_bonus + cfg.mistakes.adaptive_difficulty_bonus
        );
    }

    #[test]
    fn moderate_tiers() {
        let cfg = config();
        let with = |moderate: u32| {
            let t = TelemetrySnapshot {
                critical_mistakes: Some(5),
                moderate_mistakes: Some(moderate),
                ..Default::default()
            };
            mistake_adjustment(Some(&t), &cfg.mistakes)
        };
        assert_eq!(with(0), 17.0);
        assert_eq!(with(3), 12.0);
        assert_eq!(with(4), 7.0);
    }

    #[test]
    fn breakdown_total_includes_platform_bonuses() {
        let cfg = config();
        let f = compute_factors(&profile(), Some(&telemetry()), &cfg);
        assert_eq!(f.platform, 10.0);
        let manual = f.baseline + f.improvement + f.biological + f.stress + f.mistakes + 10.0;
        assert!(approx(f.total(), manual));
    }
}
