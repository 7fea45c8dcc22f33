//! Score synthesis and rank projection.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::factors::FactorBreakdown;
use crate::rank_table::RankTable;

/// Closed interval with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Interval<T> {
    /// Build an interval from two ends in either order.
    pub fn ordered(a: T, b: T) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Projected exam score distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePrediction {
    pub most_likely: u16,
    pub best_case: u16,
    pub worst_case: u16,
    pub confidence_range: Interval<u16>,
}

/// Projected national rank distribution.
///
/// A better standing is a smaller number, so `best_case <= most_likely <=
/// worst_case` numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPrediction {
    pub most_likely: u32,
    pub best_case: u32,
    pub worst_case: u32,
    pub confidence_range: Interval<u32>,
}

/// Sum the factors and clamp into the score domain.
///
/// The most-likely score is clamped first; the case margins and confidence
/// range are derived from the clamped value, so ordering survives clamping.
pub fn synthesize(factors: &FactorBreakdown, scoring: &ScoringConfig) -> ScorePrediction {
    let max = scoring.max_score;
    let floor = scoring.min_floor.min(max);
    let absolute_min = scoring.absolute_min.min(floor);

    let sum = factors.total();
    let most_likely = if sum.is_finite() {
        sum.clamp(f64::from(floor), f64::from(max)).round() as u16
    } else {
        tracing::warn!("factor sum is not finite, using the score floor");
        floor
    };

    let best_case = most_likely.saturating_add(scoring.case_margin).min(max);
    let worst_case = most_likely
        .saturating_sub(scoring.case_margin)
        .max(absolute_min);
    let confidence_range = Interval {
        min: most_likely
            .saturating_sub(scoring.confidence_spread)
            .max(absolute_min),
        max: most_likely.saturating_add(scoring.confidence_spread).min(max),
    };

    tracing::debug!(sum, most_likely, best_case, worst_case, "score synthesized");
    ScorePrediction {
        most_likely,
        best_case,
        worst_case,
        confidence_range,
    }
}

/// Project every score through the rank table.
pub fn project_ranks(score: &ScorePrediction, table: &RankTable) -> RankPrediction {
    RankPrediction {
        most_likely: table.rank_for(score.most_likely),
        best_case: table.rank_for(score.best_case),
        worst_case: table.rank_for(score.worst_case),
        // Rank reverses score order, so the ends may swap.
        confidence_range: Interval::ordered(
            table.rank_for(score.confidence_range.min),
            table.rank_for(score.confidence_range.max),
        ),
    }
}
