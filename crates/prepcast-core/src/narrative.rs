//! Coaching narrative exchange with an external text service.
//!
//! The engine never calls the service. This module builds the request text
//! and decodes the reply. Replies are untrusted: they must match a strict
//! schema, and anything else yields a deterministic fallback narrative built
//! from the forecast itself.

use serde::{Deserialize, Serialize};

use crate::engine::PredictionResult;
use crate::error::NarrativeError;
use crate::model::{Profile, TelemetrySnapshot};

pub const MAX_SUMMARY_CHARS: usize = 600;
pub const MAX_FOCUS_POINTS: usize = 6;
pub const MAX_FOCUS_POINT_CHARS: usize = 200;
pub const MAX_ENCOURAGEMENT_CHARS: usize = 300;

/// System prompt sent alongside `narrative_prompt`.
pub const NARRATIVE_SYSTEM_PROMPT: &str = "You are an exam preparation coach. Respond ONLY with a JSON object with the keys \"summary\", \"focus_points\" and \"encouragement\". Do not add any other keys or any text outside the object.";

/// Decoded coaching narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Narrative {
    pub summary: String,
    pub focus_points: Vec<String>,
    #[serde(default)]
    pub encouragement: String,
}

impl Narrative {
    fn validate(&self) -> Result<(), NarrativeError> {
        if self.summary.trim().is_empty() {
            return Err(field_error("summary", "must not be empty"));
        }
        if self.summary.chars().count() > MAX_SUMMARY_CHARS {
            return Err(field_error(
                "summary",
                format!("exceeds {MAX_SUMMARY_CHARS} characters"),
            ));
        }
        if self.focus_points.is_empty() || self.focus_points.len() > MAX_FOCUS_POINTS {
            return Err(field_error(
                "focus_points",
                format!(
                    "must hold 1 to {MAX_FOCUS_POINTS} entries, got {}",
                    self.focus_points.len()
                ),
            ));
        }
        if let Some(point) = self
            .focus_points
            .iter()
            .find(|p| p.trim().is_empty() || p.chars().count() > MAX_FOCUS_POINT_CHARS)
        {
            return Err(field_error(
                "focus_points",
                format!("entry '{}' is empty or too long", truncate(point, 40)),
            ));
        }
        if self.encouragement.chars().count() > MAX_ENCOURAGEMENT_CHARS {
            return Err(field_error(
                "encouragement",
                format!("exceeds {MAX_ENCOURAGEMENT_CHARS} characters"),
            ));
        }
        Ok(())
    }
}

fn field_error(field: &'static str, reason: impl Into<String>) -> NarrativeError {
    NarrativeError::Field {
        field,
        reason: reason.into(),
    }
}

/// Remove surrounding whitespace and at most one Markdown code fence.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

/// Strictly decode a reply.
pub fn parse_narrative(raw: &str) -> Result<Narrative, NarrativeError> {
    let narrative: Narrative = serde_json::from_str(strip_fence(raw))?;
    narrative.validate()?;
    Ok(narrative)
}

/// Decode a reply, falling back to `fallback_narrative` on any failure.
pub fn decode_narrative(raw: &str, result: &PredictionResult) -> Narrative {
    match parse_narrative(raw) {
        Ok(narrative) => narrative,
        Err(e) => {
            tracing::warn!("narrative rejected, using fallback: {e}");
            fallback_narrative(result)
        }
    }
}

/// Narrative derived from the forecast alone.
pub fn fallback_narrative(result: &PredictionResult) -> Narrative {
    let summary = format!(
        "Projected score {} (range {}-{}), projected rank around {}, with {}% confidence.",
        result.score.most_likely,
        result.score.confidence_range.min,
        result.score.confidence_range.max,
        result.rank.most_likely,
        result.confidence_level
    );

    let mut focus_points: Vec<String> = result
        .analysis
        .immediate_actions
        .iter()
        .take(MAX_FOCUS_POINTS)
        .map(|action| truncate(action, MAX_FOCUS_POINT_CHARS))
        .collect();
    if focus_points.is_empty() {
        focus_points.push("Keep following the 30-day roadmap".to_string());
    }

    Narrative {
        summary,
        focus_points,
        encouragement: "Steady daily practice moves the forecast more than any single test."
            .to_string(),
    }
}

/// Request text for the narrative service.
pub fn narrative_prompt(
    profile: &Profile,
    telemetry: Option<&TelemetrySnapshot>,
    result: &PredictionResult,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("Write a short coaching note for an exam candidate.\n\n");
    prompt.push_str("Candidate:\n");
    prompt.push_str(&format!(
        "- category {}, attempt {}, foundation {}\n",
        profile.category, profile.attempt_number, profile.foundation
    ));
    prompt.push_str(&format!(
        "- target score {:.0}, studying {:.1} of {:.1} target hours a day\n",
        profile.target_score, profile.study_hours.current, profile.study_hours.target
    ));

    prompt.push_str("\nRecent activity:\n");
    match telemetry.filter(|t| !t.is_empty()) {
        Some(t) => {
            let lines = [
                ("average test score", t.avg_test_score),
                ("best test score", t.best_test_score),
                ("consistency", t.consistency_score),
                ("improvement trend %", t.improvement_trend),
                ("energy", t.avg_energy),
                ("stress", t.avg_stress),
            ];
            for (name, value) in lines {
                if let Some(v) = value {
                    prompt.push_str(&format!("- {name}: {v:.1}\n"));
                }
            }
            if let Some(category) = &t.top_mistake_category {
                prompt.push_str(&format!("- most frequent mistakes: {category}\n"));
            }
        }
        None => prompt.push_str("- no recent activity recorded\n"),
    }

    prompt.push_str("\nForecast:\n");
    prompt.push_str(&format!(
        "- score {} (worst {}, best {}), rank {}, confidence {}%\n",
        result.score.most_likely,
        result.score.worst_case,
        result.score.best_case,
        result.rank.most_likely,
        result.confidence_level
    ));
    for weakness in &result.analysis.critical_weaknesses {
        prompt.push_str(&format!("- weakness: {weakness}\n"));
    }

    prompt.push_str(&format!(
        "\nReply with a JSON object: \"summary\" (at most {MAX_SUMMARY_CHARS} characters), \
         \"focus_points\" (1 to {MAX_FOCUS_POINTS} strings) and \"encouragement\".\n"
    ));
    prompt
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::predict;
    use crate::model::fixtures::{profile, telemetry};

    fn result() -> PredictionResult {
        predict(&profile(), Some(&telemetry())).unwrap()
    }

    const VALID: &str = r#"{
        "summary": "You are on track for a top-10k rank.",
        "focus_points": ["Organic chemistry named reactions", "Physics numericals under time"],
        "encouragement": "Keep going."
    }"#;

    #[test]
    fn decodes_plain_json() {
        let n = parse_narrative(VALID).unwrap();
        assert_eq!(n.focus_points.len(), 2);
        assert_eq!(n.encouragement, "Keep going.");
    }

    #[test]
    fn decodes_fenced_json() {
        let fenced = format!("  ```json\n{VALID}\n```\n");
        assert!(parse_narrative(&fenced).is_ok());
    }

    #[test]
    fn rejects_prose_around_json() {
        let wrapped = format!("Sure! Here it is:\n{VALID}");
        assert!(matches!(
            parse_narrative(&wrapped),
            Err(NarrativeError::Json(_))
        ));
    }

    #[test]
    fn rejects_unknown_fields() {
        let extra = r#"{"summary": "ok", "focus_points": ["a"], "mood": "happy"}"#;
        assert!(parse_narrative(extra).is_err());
    }

    #[test]
    fn rejects_empty_focus_points() {
        let empty = r#"{"summary": "ok", "focus_points": []}"#;
        let err = parse_narrative(empty).unwrap_err();
        assert!(err.to_string().contains("focus_points"));
    }

    #[test]
    fn rejects_oversized_summary() {
        let long = format!(
            r#"{{"summary": "{}", "focus_points": ["a"]}}"#,
            "x".repeat(MAX_SUMMARY_CHARS + 1)
        );
        assert!(parse_narrative(&long).is_err());
    }

    #[test]
    fn malformed_reply_falls_back_deterministically() {
        let r = result();
        let a = decode_narrative("not json at all", &r);
        let b = decode_narrative("{\"summary\": 3}", &r);
        assert_eq!(a, b);
        assert_eq!(a, fallback_narrative(&r));
        assert!(a.summary.contains(&r.score.most_likely.to_string()));
        assert!(!a.focus_points.is_empty());
    }

    #[test]
    fn prompt_mentions_forecast_and_telemetry() {
        let r = result();
        let prompt = narrative_prompt(&profile(), Some(&telemetry()), &r);
        assert!(prompt.contains(&format!("score {}", r.score.most_likely)));
        assert!(prompt.contains("organic chemistry"));

        let bare = narrative_prompt(&profile(), None, &r);
        assert!(bare.contains("no recent activity recorded"));
    }
}
