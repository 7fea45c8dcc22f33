//! Self-reported forecast confidence, driven by input completeness.

use crate::config::ConfidenceConfig;
use crate::model::TelemetrySnapshot;

/// Confidence percentage in `[cfg.base, cfg.max]`.
///
/// Absent telemetry yields exactly `cfg.base`; this is the only signal that
/// a forecast ran on defaults.
pub fn confidence_for(telemetry: Option<&TelemetrySnapshot>, cfg: &ConfidenceConfig) -> u8 {
    let Some(t) = telemetry.filter(|t| !t.is_empty()) else {
        return cfg.base;
    };

    let mut level = u32::from(cfg.base) + u32::from(cfg.telemetry_increment);
    if t
        .consistency_score
        .is_some_and(|c| c > cfg.consistency_threshold)
    {
        level += u32::from(cfg.consistency_increment);
    }
    if t.avg_test_score.is_some() {
        level += u32::from(cfg.test_data_increment);
    }

    let capped = level.clamp(u32::from(cfg.base), u32::from(cfg.max.max(cfg.base)));
    u8::try_from(capped).unwrap_or(cfg.max)
}
