//! Rule-based recommendations, roadmap and risk assessment.
//!
//! Rules only fire on telemetry that was actually observed; defaults feed the
//! numeric scorers but never produce a strength or a risk on their own. Every
//! list keeps rule order so the output is deterministic.

use serde::{Deserialize, Serialize};

use crate::config::{AdvisorConfig, EngineConfig, HorizonConfig};
use crate::model::{FoundationStrength, PressureLevel, Profile, Subject, TelemetrySnapshot};
use crate::synthesis::ScorePrediction;

/// Qualitative reading of the candidate's current position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub strengths: Vec<String>,
    pub critical_weaknesses: Vec<String>,
    pub mid_level_areas: Vec<String>,
    pub immediate_actions: Vec<String>,
}

/// Daily question target for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTarget {
    pub subject: Subject,
    pub daily_questions: u32,
}

/// Targets for one planning horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    pub horizon_days: u16,
    pub target_score: u16,
    pub study_hours_per_day: f64,
    pub daily_questions: u32,
    pub subject_targets: Vec<SubjectTarget>,
    pub focus_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementRoadmap {
    pub next_30_days: RoadmapPhase,
    pub next_90_days: RoadmapPhase,
    pub final_180_days: RoadmapPhase,
}

impl ImprovementRoadmap {
    pub fn phases(&self) -> [&RoadmapPhase; 3] {
        [&self.next_30_days, &self.next_90_days, &self.final_180_days]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub high_risk: Vec<String>,
    pub medium_risk: Vec<String>,
    pub low_risk: Vec<String>,
    pub mitigation_strategies: Vec<String>,
}

/// Run all three generators.
pub fn analyze(
    profile: &Profile,
    telemetry: Option<&TelemetrySnapshot>,
    score: &ScorePrediction,
    config: &EngineConfig,
) -> (DetailedAnalysis, ImprovementRoadmap, RiskAssessment) {
    (
        detailed_analysis(profile, telemetry, &config.advisor),
        improvement_roadmap(profile, telemetry, score, config),
        risk_assessment(profile, telemetry, &config.advisor),
    )
}

pub fn detailed_analysis(
    profile: &Profile,
    telemetry: Option<&TelemetrySnapshot>,
    cfg: &AdvisorConfig,
) -> DetailedAnalysis {
    let empty = TelemetrySnapshot::default();
    let t = telemetry.unwrap_or(&empty);
    let mut analysis = DetailedAnalysis::default();

    // Strengths.
    if let Some(c) = t.consistency_score.filter(|c| *c >= cfg.strong_consistency) {
        analysis
            .strengths
            .push(format!("Consistent daily practice (consistency {c:.0}/100)"));
    }
    if let Some(e) = t.avg_energy.filter(|e| *e >= cfg.healthy_energy) {
        analysis
            .strengths
            .push(format!("Healthy energy levels (average {e:.1}/10)"));
    }
    if matches!(
        profile.foundation,
        FoundationStrength::Strong | FoundationStrength::Good
    ) {
        analysis.strengths.push(format!(
            "{} conceptual foundation",
            capitalize(profile.foundation.as_str())
        ));
    }
    if let Some(trend) = t.improvement_trend.filter(|tr| *tr > 0.0) {
        analysis
            .strengths
            .push(format!("Scores trending upward (+{trend:.1}%)"));
    }
    if t.best_test_score.is_some_and(|best| best >= profile.target_score) {
        analysis
            .strengths
            .push("Best test score already meets the target".to_string());
    }
    if let Some(first) = profile.subject_preference.first() {
        analysis
            .strengths
            .push(format!("Command of {}", capitalize(first.as_str())));
    }

    // Critical weaknesses, each paired with an immediate action.
    if let Some(n) = t.critical_mistakes.filter(|n| *n > 0) {
        let (weakness, action) = match &t.top_mistake_category {
            Some(category) => (
                format!("{n} unresolved critical mistake pattern(s), mostly in {category}"),
                format!("Re-solve every recent {category} error from the mistake log this week"),
            ),
            None => (
                format!("{n} unresolved critical mistake pattern(s)"),
                "Re-solve every critical error from the mistake log this week".to_string(),
            ),
        };
        analysis.critical_weaknesses.push(weakness);
        analysis.immediate_actions.push(action);
    }
    if let Some(s) = t.avg_stress.filter(|s| *s >= cfg.high_stress) {
        analysis
            .critical_weaknesses
            .push(format!("High stress (average {s:.1}/10)"));
        analysis
            .immediate_actions
            .push("Add a 10-minute breathing routine before every mock test".to_string());
    }
    if let Some(c) = t.consistency_score.filter(|c| *c < cfg.weak_consistency) {
        analysis
            .critical_weaknesses
            .push(format!("Irregular study rhythm (consistency {c:.0}/100)"));
        analysis
            .immediate_actions
            .push("Fix a daily study start time and keep it for 14 days".to_string());
    }
    if let Some(e) = t.avg_energy.filter(|e| *e < cfg.low_energy) {
        analysis
            .critical_weaknesses
            .push(format!("Chronic low energy (average {e:.1}/10)"));
        analysis
            .immediate_actions
            .push("Move the hardest subject into the best-energy time slot".to_string());
    }
    if profile.study_hours.current < profile.study_hours.target {
        analysis.critical_weaknesses.push(format!(
            "Studying {:.1} h/day against a {:.1} h target",
            profile.study_hours.current, profile.study_hours.target
        ));
        analysis.immediate_actions.push(format!(
            "Add {:.1} h of focused study per day",
            profile.study_hours.target - profile.study_hours.current
        ));
    }

    // Mid-level areas.
    if let Some(n) = t.moderate_mistakes.filter(|n| *n > 0) {
        analysis
            .mid_level_areas
            .push(format!("{n} moderate mistake pattern(s) still recurring"));
    }
    if profile.subject_preference.len() >= 2 {
        if let Some(last) = profile.subject_preference.last() {
            analysis
                .mid_level_areas
                .push(format!("{} needs more practice time", capitalize(last.as_str())));
        }
    }
    if profile.daily_questions.current < profile.daily_questions.target {
        analysis.mid_level_areas.push(format!(
            "Solving {} questions/day against a {} target",
            profile.daily_questions.current, profile.daily_questions.target
        ));
    }
    if profile.sleep_hours < cfg.recommended_sleep_hours {
        analysis.mid_level_areas.push(format!(
            "Sleeping {:.1} h, below the recommended {:.0} h",
            profile.sleep_hours, cfg.recommended_sleep_hours
        ));
    }

    if analysis.immediate_actions.is_empty() {
        analysis.immediate_actions.push(
            "Take one full-length mock test every week and review it the same day".to_string(),
        );
    }

    analysis
}

pub fn improvement_roadmap(
    profile: &Profile,
    telemetry: Option<&TelemetrySnapshot>,
    score: &ScorePrediction,
    config: &EngineConfig,
) -> ImprovementRoadmap {
    let cfg = &config.advisor;
    let base_questions = telemetry
        .and_then(|t| t.avg_daily_questions)
        .unwrap_or_else(|| f64::from(profile.daily_questions.current));
    let top_mistake = telemetry.and_then(|t| t.top_mistake_category.as_deref());
    let weakest = weakest_subject(profile);

    let phase = |horizon: &HorizonConfig, focus_areas: Vec<String>| {
        let ml = f64::from(score.most_likely);
        let max = f64::from(config.scoring.max_score);
        let target = (ml + (profile.target_score - ml).max(0.0) * horizon.gap_fraction)
            .round()
            .clamp(0.0, max) as u16;

        let hours = profile.study_hours.current
            + (profile.study_hours.target - profile.study_hours.current) * horizon.gap_fraction;
        let daily = (base_questions * (1.0 + horizon.question_step)).round().max(0.0) as u32;

        RoadmapPhase {
            horizon_days: horizon.days,
            target_score: target,
            study_hours_per_day: (hours * 10.0).round() / 10.0,
            daily_questions: daily,
            subject_targets: subject_targets(daily, cfg),
            focus_areas,
        }
    };

    let first_focus = match top_mistake {
        Some(category) => format!("Eliminate recurring {category} mistakes"),
        None => "Build a mistake log and review it daily".to_string(),
    };

    ImprovementRoadmap {
        next_30_days: phase(
            &cfg.next_30_days,
            vec![
                first_focus,
                "Lock in a fixed daily study routine".to_string(),
            ],
        ),
        next_90_days: phase(
            &cfg.next_90_days,
            vec![
                format!("Strengthen {}", capitalize(weakest.as_str())),
                "Two full-length mock tests per week".to_string(),
            ],
        ),
        final_180_days: phase(
            &cfg.final_180_days,
            vec![
                "Timed revision of the full syllabus".to_string(),
                "Exam-day simulations at the real exam time".to_string(),
            ],
        ),
    }
}

fn weakest_subject(profile: &Profile) -> Subject {
    profile
        .subject_preference
        .last()
        .copied()
        .unwrap_or(Subject::Physics)
}

fn subject_targets(daily: u32, cfg: &AdvisorConfig) -> Vec<SubjectTarget> {
    let shares = &cfg.subject_shares;
    Subject::ALL
        .iter()
        .map(|&subject| {
            let share = match subject {
                Subject::Physics => shares.physics,
                Subject::Chemistry => shares.chemistry,
                Subject::Biology => shares.biology,
            };
            SubjectTarget {
                subject,
                daily_questions: (f64::from(daily) * share).round() as u32,
            }
        })
        .collect()
}

pub fn risk_assessment(
    profile: &Profile,
    telemetry: Option<&TelemetrySnapshot>,
    cfg: &AdvisorConfig,
) -> RiskAssessment {
    let seeded = &cfg.seeded_risks;
    let mut risks = RiskAssessment {
        high_risk: seeded.high.clone(),
        medium_risk: seeded.medium.clone(),
        low_risk: seeded.low.clone(),
        mitigation_strategies: seeded.mitigations.clone(),
    };

    let empty = TelemetrySnapshot::default();
    let t = telemetry.unwrap_or(&empty);

    if let Some(e) = t.avg_energy.filter(|e| *e < cfg.low_energy) {
        risks
            .high_risk
            .push(format!("Chronic low energy (average {e:.1}/10) on exam day"));
        risks
            .mitigation_strategies
            .push("Stabilise sleep and meals before adding study hours".to_string());
    }
    if let Some(s) = t.avg_stress.filter(|s| *s >= cfg.high_stress) {
        risks
            .high_risk
            .push(format!("Exam-hall anxiety from sustained stress ({s:.1}/10)"));
        risks
            .mitigation_strategies
            .push("Rehearse the exam routine in timed mocks to make it familiar".to_string());
    }
    if let Some(n) = t
        .critical_mistakes
        .filter(|n| *n >= cfg.critical_mistake_risk)
    {
        risks
            .high_risk
            .push(format!("{n} critical mistake patterns likely to repeat under pressure"));
        risks
            .mitigation_strategies
            .push("Review the mistake log before every practice session".to_string());
    }

    if let Some(c) = t.consistency_score.filter(|c| *c < cfg.weak_consistency) {
        risks
            .medium_risk
            .push(format!("Inconsistent preparation (consistency {c:.0}/100)"));
        risks
            .mitigation_strategies
            .push("Track a daily minimum question count and never skip it".to_string());
    }
    if profile.family_pressure == PressureLevel::High {
        risks
            .medium_risk
            .push("High family pressure adding to exam stress".to_string());
        risks
            .mitigation_strategies
            .push("Agree on weekly progress check-ins instead of daily ones".to_string());
    }
    if let Some(n) = t
        .moderate_mistakes
        .filter(|n| *n > cfg.moderate_mistake_risk)
    {
        risks
            .medium_risk
            .push(format!("{n} moderate mistake patterns eroding marks"));
        risks
            .mitigation_strategies
            .push("Group moderate mistakes by topic and revise one topic a day".to_string());
    }

    if profile.attempt_number > 2 {
        risks.low_risk.push(format!(
            "Fatigue from a long preparation cycle (attempt {})",
            profile.attempt_number
        ));
        risks
            .mitigation_strategies
            .push("Schedule one full rest day each week".to_string());
    }

    risks
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
