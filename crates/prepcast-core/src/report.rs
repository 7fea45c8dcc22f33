//! Forecast reports with JSON persistence and forecast-to-forecast comparison.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::PredictionResult;

/// A saved forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Free-form name, e.g. the week the telemetry covers.
    #[serde(default)]
    pub label: Option<String>,
    pub result: PredictionResult,
}

impl ForecastReport {
    /// Wrap a result with a fresh id and the current time.
    pub fn new(label: Option<String>, result: PredictionResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            label,
            result,
        }
    }

    /// Human-readable name: the label, else the id.
    pub fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.id.to_string())
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ForecastReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this forecast against an earlier one.
    ///
    /// A most-likely score change larger than `threshold` points in either
    /// direction decides the trend.
    pub fn compare(&self, baseline: &ForecastReport, threshold: f64) -> ForecastComparison {
        let (current, base) = (&self.result, &baseline.result);

        let score_delta = i32::from(current.score.most_likely) - i32::from(base.score.most_likely);
        let rank_delta = i64::from(current.rank.most_likely) - i64::from(base.rank.most_likely);
        let confidence_delta =
            i16::from(current.confidence_level) - i16::from(base.confidence_level);

        let names: BTreeSet<&String> = base
            .probabilities
            .keys()
            .chain(current.probabilities.keys())
            .collect();
        let band_deltas = names
            .into_iter()
            .map(|name| {
                let before = base.probabilities.get(name).copied();
                let after = current.probabilities.get(name).copied();
                BandDelta {
                    band: name.clone(),
                    baseline: before,
                    current: after,
                    delta: i16::from(after.unwrap_or(0)) - i16::from(before.unwrap_or(0)),
                }
            })
            .collect();

        let trend = if f64::from(score_delta) > threshold {
            Trend::Improved
        } else if f64::from(score_delta) < -threshold {
            Trend::Regressed
        } else {
            Trend::Unchanged
        };

        ForecastComparison {
            baseline: baseline.display_name(),
            current: self.display_name(),
            baseline_score: base.score.most_likely,
            current_score: current.score.most_likely,
            score_delta,
            baseline_rank: base.rank.most_likely,
            current_rank: current.rank.most_likely,
            rank_delta,
            confidence_delta,
            band_deltas,
            trend,
        }
    }

    /// Format the forecast as markdown.
    pub fn to_markdown(&self) -> String {
        let r = &self.result;
        let mut md = String::new();

        md.push_str(&format!("## Forecast: {}\n\n", self.display_name()));
        md.push_str(&format!(
            "**Exam year:** {} | **Confidence:** {}% | **Config:** {}\n\n",
            r.exam_year, r.confidence_level, r.config_version
        ));

        md.push_str("| | Worst case | Most likely | Best case |\n");
        md.push_str("|---|---|---|---|\n");
        md.push_str(&format!(
            "| Score | {} | {} | {} |\n",
            r.score.worst_case, r.score.most_likely, r.score.best_case
        ));
        md.push_str(&format!(
            "| Rank | {} | {} | {} |\n\n",
            r.rank.worst_case, r.rank.most_likely, r.rank.best_case
        ));

        md.push_str("### Admission probability\n\n");
        md.push_str("| Band | Probability |\n");
        md.push_str("|------|-------------|\n");
        for (band, pct) in &r.probabilities {
            md.push_str(&format!("| {band} | {pct}% |\n"));
        }
        md.push('\n');

        let sections = [
            ("Strengths", &r.analysis.strengths),
            ("Critical weaknesses", &r.analysis.critical_weaknesses),
            ("Immediate actions", &r.analysis.immediate_actions),
            ("High risks", &r.risks.high_risk),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            for item in items {
                md.push_str(&format!("- {item}\n"));
            }
            md.push('\n');
        }

        md
    }
}

/// Direction of change between two forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improved,
    Regressed,
    Unchanged,
}

/// Change in one probability band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandDelta {
    pub band: String,
    /// `None` when the band is missing from that forecast.
    pub baseline: Option<u8>,
    pub current: Option<u8>,
    pub delta: i16,
}

/// Result of comparing two forecasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastComparison {
    pub baseline: String,
    pub current: String,
    pub baseline_score: u16,
    pub current_score: u16,
    pub score_delta: i32,
    pub baseline_rank: u32,
    pub current_rank: u32,
    /// Negative means a better standing.
    pub rank_delta: i64,
    pub confidence_delta: i16,
    pub band_deltas: Vec<BandDelta>,
    pub trend: Trend,
}

impl ForecastComparison {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} -> {}: score {:+} ({} -> {}), rank {:+} ({} -> {}), confidence {:+}, trend {}\n\n",
            self.baseline,
            self.current,
            self.score_delta,
            self.baseline_score,
            self.current_score,
            self.rank_delta,
            self.baseline_rank,
            self.current_rank,
            self.confidence_delta,
            self.trend_label()
        ));

        let changed: Vec<&BandDelta> = self.band_deltas.iter().filter(|b| b.delta != 0).collect();
        if !changed.is_empty() {
            md.push_str("### Probability changes\n\n");
            md.push_str("| Band | Baseline | Current | Delta |\n");
            md.push_str("|------|----------|---------|-------|\n");
            for b in changed {
                md.push_str(&format!(
                    "| {} | {} | {} | {:+} |\n",
                    b.band,
                    percent_cell(b.baseline),
                    percent_cell(b.current),
                    b.delta
                ));
            }
        }

        md
    }

    pub fn trend_label(&self) -> &'static str {
        match self.trend {
            Trend::Improved => "improved",
            Trend::Regressed => "regressed",
            Trend::Unchanged => "unchanged",
        }
    }

    /// Returns true if the forecast regressed beyond the threshold.
    pub fn has_regression(&self) -> bool {
        self.trend == Trend::Regressed
    }
}

fn percent_cell(value: Option<u8>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v}%"))
}
