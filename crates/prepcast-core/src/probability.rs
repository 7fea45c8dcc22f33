//! Admission probability bands.
//!
//! Each band is an independent step function of the most-likely score.
//! Bands overlap (rank bands vs. seat bands), so they do not sum to 100.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Percent awarded once the score reaches `min_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityStep {
    pub min_score: u16,
    pub percent: u8,
}

/// A named eligibility tier with its own step function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityBand {
    pub name: String,
    /// Ascending by `min_score`.
    pub steps: Vec<ProbabilityStep>,
}

/// Band name to percentage, ordered by name.
pub type ProbabilityBands = BTreeMap<String, u8>;

impl ProbabilityBand {
    pub fn new(name: &str, steps: &[(u16, u8)]) -> Self {
        Self {
            name: name.to_string(),
            steps: steps
                .iter()
                .map(|&(min_score, percent)| ProbabilityStep { min_score, percent })
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: String| ConfigError::ProbabilityBand {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(fail("band name must not be empty".into()));
        }
        if self.steps.is_empty() {
            return Err(fail("band has no steps".into()));
        }
        for pair in self.steps.windows(2) {
            if pair[1].min_score <= pair[0].min_score {
                return Err(fail(format!(
                    "steps must ascend by score ({} then {})",
                    pair[0].min_score, pair[1].min_score
                )));
            }
        }
        if let Some(step) = self.steps.iter().find(|s| s.percent > 100) {
            return Err(fail(format!("percent {} exceeds 100", step.percent)));
        }

        Ok(())
    }

    /// Percentage for a score: the last step reached, else 0.
    pub fn percent_for(&self, score: u16) -> u8 {
        self.steps
            .iter()
            .take_while(|step| step.min_score <= score)
            .last()
            .map(|step| step.percent.min(100))
            .unwrap_or(0)
    }
}

/// Validate a full band list, including name uniqueness.
pub fn validate_bands(bands: &[ProbabilityBand]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    for band in bands {
        band.validate()?;
        if !names.insert(band.name.as_str()) {
            return Err(ConfigError::ProbabilityBand {
                name: band.name.clone(),
                reason: "defined more than once".into(),
            });
        }
    }
    Ok(())
}

/// Evaluate every band against the most-likely score.
pub fn probabilities_for(score: u16, bands: &[ProbabilityBand]) -> ProbabilityBands {
    bands
        .iter()
        .map(|band| (band.name.clone(), band.percent_for(score)))
        .collect()
}

/// Default bands for the 2025.1 configuration.
pub fn default_bands() -> Vec<ProbabilityBand> {
    vec![
        ProbabilityBand::new("top_100", &[(705, 10), (710, 35), (715, 70)]),
        ProbabilityBand::new("top_1000", &[(690, 15), (700, 40), (710, 75), (715, 95)]),
        ProbabilityBand::new("top_10000", &[(660, 30), (670, 55), (680, 80), (690, 95)]),
        ProbabilityBand::new(
            "government_college",
            &[(620, 25), (640, 50), (655, 75), (670, 92)],
        ),
        ProbabilityBand::new(
            "private_college",
            &[(560, 40), (600, 70), (630, 90), (650, 98)],
        ),
    ]
}
