//! Core input types: the candidate profile and the telemetry snapshot.
//!
//! A `Profile` changes rarely and must be valid before any prediction runs.
//! A `TelemetrySnapshot` is rebuilt for every request and is allowed to be
//! partial; absent values fall back to per-factor defaults.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Highest score the exam awards.
pub const EXAM_MAX_SCORE: f64 = 720.0;

/// Most questions a day that profiles and telemetry may report.
pub const MAX_DAILY_QUESTIONS: f64 = 2000.0;

/// Lowercase a token and fold `-` and spaces into `_`.
fn normalize_token(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $field:literal {
            $( $variant:ident => $label:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every member of the closed set, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match normalize_token(s).as_str() {
                    $( $label $(| $alias)* => Ok($name::$variant), )+
                    _ => Err(ValidationError::UnknownValue {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

closed_enum! {
    /// Admission category used for quota eligibility.
    Category as "category" {
        General => "general" | "gen" | "ur",
        Ews => "ews",
        Obc => "obc" | "obc_ncl",
        Sc => "sc",
        St => "st",
    }
}

closed_enum! {
    /// Geographic region of the candidate.
    Region as "region" {
        North => "north",
        South => "south",
        East => "east",
        West => "west",
        Central => "central",
        NorthEast => "north_east" | "northeast" | "ne",
    }
}

closed_enum! {
    /// Qualitative strength of the candidate's conceptual foundation.
    FoundationStrength as "foundation" {
        Strong => "strong",
        Good => "good",
        Average => "average",
        Weak => "weak",
    }
}

closed_enum! {
    SleepQuality as "sleep_quality" {
        Good => "good",
        Fair => "fair",
        Poor => "poor",
    }
}

closed_enum! {
    /// How much pressure the family puts on the candidate.
    PressureLevel as "family_pressure" {
        Low => "low",
        Moderate => "moderate" | "medium",
        High => "high",
    }
}

closed_enum! {
    /// Exam subjects, in the order a candidate may rank them.
    Subject as "subject_preference" {
        Physics => "physics" | "phy",
        Chemistry => "chemistry" | "chem",
        Biology => "biology" | "bio",
    }
}

/// Closed `[min, max]` score interval reported by the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// A current value paired with the value the candidate is aiming for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal<T> {
    pub current: T,
    pub target: T,
}

/// Validated, long-lived candidate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub category: Category,
    pub region: Region,
    /// Identifier of the coaching channel the candidate studies with.
    pub coaching_channel: String,
    pub attempt_number: u8,
    pub preparation_years: f64,
    /// Percentage scored in the qualifying (school-leaving) exam.
    pub qualifying_percentage: f64,
    pub board: String,
    pub foundation: FoundationStrength,
    pub mock_score_range: ScoreRange,
    pub target_score: f64,
    pub study_hours: Goal<f64>,
    pub daily_questions: Goal<u32>,
    pub sleep_hours: f64,
    pub sleep_quality: SleepQuality,
    /// Recurring low-energy days, e.g. a cyclical pattern the candidate tracks.
    #[serde(default)]
    pub low_energy_days: Vec<String>,
    #[serde(default)]
    pub best_time_slots: Vec<String>,
    #[serde(default)]
    pub worst_time_slots: Vec<String>,
    /// Strongest subject first.
    #[serde(default)]
    pub subject_preference: Vec<Subject>,
    #[serde(default)]
    pub lifestyle_tags: Vec<String>,
    #[serde(default)]
    pub stress_triggers: Vec<String>,
    pub family_pressure: PressureLevel,
    #[serde(default)]
    pub target_exam_year: Option<u16>,
}

impl Profile {
    /// Re-check every numeric bound and list constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.coaching_channel.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "coaching_channel",
            });
        }
        check_bounds("attempt_number", f64::from(self.attempt_number), 1.0, 10.0)?;
        check_bounds("preparation_years", self.preparation_years, 0.0, 10.0)?;
        check_bounds(
            "qualifying_percentage",
            self.qualifying_percentage,
            0.0,
            100.0,
        )?;
        check_bounds(
            "mock_score_min",
            self.mock_score_range.min,
            0.0,
            EXAM_MAX_SCORE,
        )?;
        check_bounds(
            "mock_score_max",
            self.mock_score_range.max,
            0.0,
            EXAM_MAX_SCORE,
        )?;
        if self.mock_score_range.min > self.mock_score_range.max {
            return Err(ValidationError::InvertedRange {
                field: "mock_score_range",
                min: self.mock_score_range.min,
                max: self.mock_score_range.max,
            });
        }
        check_bounds("target_score", self.target_score, 0.0, EXAM_MAX_SCORE)?;
        check_bounds("current_study_hours", self.study_hours.current, 0.0, 24.0)?;
        check_bounds("target_study_hours", self.study_hours.target, 0.0, 24.0)?;
        check_bounds(
            "current_daily_questions",
            f64::from(self.daily_questions.current),
            0.0,
            MAX_DAILY_QUESTIONS,
        )?;
        check_bounds(
            "target_daily_questions",
            f64::from(self.daily_questions.target),
            0.0,
            MAX_DAILY_QUESTIONS,
        )?;
        check_bounds("sleep_hours", self.sleep_hours, 0.0, 24.0)?;

        let mut seen = HashSet::new();
        for subject in &self.subject_preference {
            if !seen.insert(subject) {
                return Err(ValidationError::Duplicate {
                    field: "subject_preference",
                    value: subject.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Whether any lifestyle tag mentions the given keyword.
    pub fn has_lifestyle_tag(&self, keyword: &str) -> bool {
        self.lifestyle_tags
            .iter()
            .any(|tag| tag.to_ascii_lowercase().contains(keyword))
    }
}

fn check_bounds(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Loosely-typed profile as handed over by a data repository or a file.
///
/// Closed-set fields are plain strings here; `Profile::try_from` is the
/// validation gate that turns them into enums.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub category: Option<String>,
    pub region: Option<String>,
    pub coaching_channel: Option<String>,
    pub attempt_number: Option<u8>,
    pub preparation_years: Option<f64>,
    pub qualifying_percentage: Option<f64>,
    pub board: Option<String>,
    pub foundation: Option<String>,
    pub mock_score_min: Option<f64>,
    pub mock_score_max: Option<f64>,
    pub target_score: Option<f64>,
    pub current_study_hours: Option<f64>,
    pub target_study_hours: Option<f64>,
    pub current_daily_questions: Option<u32>,
    pub target_daily_questions: Option<u32>,
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<String>,
    pub low_energy_days: Vec<String>,
    pub best_time_slots: Vec<String>,
    pub worst_time_slots: Vec<String>,
    pub subject_preference: Vec<String>,
    pub lifestyle_tags: Vec<String>,
    pub stress_triggers: Vec<String>,
    pub family_pressure: Option<String>,
    pub target_exam_year: Option<u16>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField { field })
}

fn required_enum<E>(value: Option<String>, field: &'static str) -> Result<E, ValidationError>
where
    E: FromStr<Err = ValidationError>,
{
    required(value, field)?.parse()
}

fn optional_enum<E>(value: Option<String>, default: E) -> Result<E, ValidationError>
where
    E: FromStr<Err = ValidationError>,
{
    value.map(|v| v.parse()).transpose().map(|v| v.unwrap_or(default))
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = ValidationError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        let subject_preference = record
            .subject_preference
            .iter()
            .map(|s| s.parse::<Subject>())
            .collect::<Result<Vec<_>, _>>()?;

        let profile = Profile {
            category: required_enum(record.category, "category")?,
            region: required_enum(record.region, "region")?,
            coaching_channel: required(record.coaching_channel, "coaching_channel")?,
            attempt_number: required(record.attempt_number, "attempt_number")?,
            preparation_years: record.preparation_years.unwrap_or(1.0),
            qualifying_percentage: required(
                record.qualifying_percentage,
                "qualifying_percentage",
            )?,
            board: record
                .board
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| "other".to_string()),
            foundation: required_enum(record.foundation, "foundation")?,
            mock_score_range: ScoreRange {
                min: required(record.mock_score_min, "mock_score_min")?,
                max: required(record.mock_score_max, "mock_score_max")?,
            },
            target_score: required(record.target_score, "target_score")?,
            study_hours: Goal {
                current: required(record.current_study_hours, "current_study_hours")?,
                target: required(record.target_study_hours, "target_study_hours")?,
            },
            daily_questions: Goal {
                current: required(record.current_daily_questions, "current_daily_questions")?,
                target: required(record.target_daily_questions, "target_daily_questions")?,
            },
            sleep_hours: record.sleep_hours.unwrap_or(7.0),
            sleep_quality: optional_enum(record.sleep_quality, SleepQuality::Fair)?,
            low_energy_days: record.low_energy_days,
            best_time_slots: record.best_time_slots,
            worst_time_slots: record.worst_time_slots,
            subject_preference,
            lifestyle_tags: record.lifestyle_tags,
            stress_triggers: record.stress_triggers,
            family_pressure: optional_enum(record.family_pressure, PressureLevel::Moderate)?,
            target_exam_year: record.target_exam_year,
        };

        profile.validate()?;
        Ok(profile)
    }
}

/// Aggregated recent-activity signals, recomputed for every request.
///
/// Every field is optional. Absence is never an error, and neither is a
/// value of the wrong type: it is read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySnapshot {
    #[serde(deserialize_with = "lenient")]
    pub avg_test_score: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub best_test_score: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub avg_daily_questions: Option<f64>,
    /// Day-to-day regularity, 0–100.
    #[serde(deserialize_with = "lenient")]
    pub consistency_score: Option<f64>,
    /// Signed percentage change in recent scores.
    #[serde(deserialize_with = "lenient")]
    pub improvement_trend: Option<f64>,
    /// Recurring mistake patterns still unresolved.
    #[serde(deserialize_with = "lenient")]
    pub critical_mistakes: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub moderate_mistakes: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub top_mistake_category: Option<String>,
    /// Self-reported, 1–10.
    #[serde(deserialize_with = "lenient")]
    pub avg_energy: Option<f64>,
    /// Self-reported, 1–10.
    #[serde(deserialize_with = "lenient")]
    pub avg_stress: Option<f64>,
}

/// Read a telemetry value, mapping anything that does not fit `T` to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(&value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::warn!("ignoring malformed telemetry value {value}: {e}");
            Ok(None)
        }
    }
}

impl TelemetrySnapshot {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.numeric_fields().iter().all(|(_, v, _, _)| v.is_none())
            && self.critical_mistakes.is_none()
            && self.moderate_mistakes.is_none()
            && self.top_mistake_category.is_none()
    }

    fn numeric_fields(&self) -> [(&'static str, Option<f64>, f64, f64); 7] {
        [
            ("avg_test_score", self.avg_test_score, 0.0, EXAM_MAX_SCORE),
            ("best_test_score", self.best_test_score, 0.0, EXAM_MAX_SCORE),
            ("avg_daily_questions", self.avg_daily_questions, 0.0, MAX_DAILY_QUESTIONS),
            ("consistency_score", self.consistency_score, 0.0, 100.0),
            ("improvement_trend", self.improvement_trend, -100.0, 100.0),
            ("avg_energy", self.avg_energy, 1.0, 10.0),
            ("avg_stress", self.avg_stress, 1.0, 10.0),
        ]
    }

    /// Names of fields that hold a non-finite or out-of-domain value.
    pub fn discarded_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = self
            .numeric_fields()
            .iter()
            .filter_map(|(name, value, min, max)| match value {
                Some(v) if !v.is_finite() || *v < *min || *v > *max => Some(*name),
                _ => None,
            })
            .collect();
        if self
            .top_mistake_category
            .as_ref()
            .is_some_and(|c| c.trim().is_empty())
        {
            fields.push("top_mistake_category");
        }
        fields
    }

    /// Copy with every malformed value replaced by `None`.
    pub fn sanitized(&self) -> TelemetrySnapshot {
        let discarded = self.discarded_fields();
        for field in &discarded {
            tracing::warn!("telemetry field '{field}' is malformed, falling back to default");
        }
        let keep = |name: &'static str, value: Option<f64>| {
            if discarded.contains(&name) {
                None
            } else {
                value
            }
        };

        TelemetrySnapshot {
            avg_test_score: keep("avg_test_score", self.avg_test_score),
            best_test_score: keep("best_test_score", self.best_test_score),
            avg_daily_questions: keep("avg_daily_questions", self.avg_daily_questions),
            consistency_score: keep("consistency_score", self.consistency_score),
            improvement_trend: keep("improvement_trend", self.improvement_trend),
            critical_mistakes: self.critical_mistakes,
            moderate_mistakes: self.moderate_mistakes,
            top_mistake_category: self
                .top_mistake_category
                .clone()
                .filter(|c| !c.trim().is_empty()),
            avg_energy: keep("avg_energy", self.avg_energy),
            avg_stress: keep("avg_stress", self.avg_stress),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record() -> ProfileRecord {
        ProfileRecord {
            category: Some("general".into()),
            region: Some("south".into()),
            coaching_channel: Some("online-batch-7".into()),
            attempt_number: Some(2),
            preparation_years: Some(2.0),
            qualifying_percentage: Some(91.5),
            board: Some("cbse".into()),
            foundation: Some("good".into()),
            mock_score_min: Some(600.0),
            mock_score_max: Some(660.0),
            target_score: Some(690.0),
            current_study_hours: Some(7.0),
            target_study_hours: Some(9.0),
            current_daily_questions: Some(150),
            target_daily_questions: Some(220),
            sleep_hours: Some(7.0),
            sleep_quality: Some("good".into()),
            low_energy_days: vec!["day 1-2 of cycle".into()],
            best_time_slots: vec!["morning".into()],
            worst_time_slots: vec!["late night".into()],
            subject_preference: vec!["biology".into(), "chemistry".into(), "physics".into()],
            lifestyle_tags: vec!["nutrition".into()],
            stress_triggers: vec!["mock results".into()],
            family_pressure: Some("moderate".into()),
            target_exam_year: None,
        }
    }

    pub fn profile() -> Profile {
        Profile::try_from(record()).unwrap()
    }

    pub fn telemetry() -> TelemetrySnapshot {
        TelemetrySnapshot {
            avg_test_score: Some(640.0),
            best_test_score: Some(665.0),
            avg_daily_questions: Some(160.0),
            consistency_score: Some(82.0),
            improvement_trend: Some(4.0),
            critical_mistakes: Some(1),
            moderate_mistakes: Some(2),
            top_mistake_category: Some("organic chemistry".into()),
            avg_energy: Some(7.5),
            avg_stress: Some(5.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn enum_parsing_is_lenient_about_case_and_separators() {
        assert_eq!("General".parse::<Category>().unwrap(), Category::General);
        assert_eq!("OBC-NCL".parse::<Category>().unwrap(), Category::Obc);
        assert_eq!("north east".parse::<Region>().unwrap(), Region::NorthEast);
        assert_eq!("ne".parse::<Region>().unwrap(), Region::NorthEast);
        assert_eq!("Bio".parse::<Subject>().unwrap(), Subject::Biology);
        assert_eq!(Region::NorthEast.to_string(), "north_east");
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = "martian".parse::<Category>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownValue {
                field: "category",
                value: "martian".into()
            }
        );
    }

    #[test]
    fn record_converts_to_profile() {
        let profile = profile();
        assert_eq!(profile.category, Category::General);
        assert_eq!(profile.foundation, FoundationStrength::Good);
        assert_eq!(profile.mock_score_range.midpoint(), 630.0);
        assert_eq!(profile.subject_preference[0], Subject::Biology);
        assert!(profile.has_lifestyle_tag("nutrition"));
    }

    #[test]
    fn optional_profile_fields_take_defaults() {
        let mut rec = record();
        rec.sleep_quality = None;
        rec.family_pressure = None;
        rec.board = None;
        let profile = Profile::try_from(rec).unwrap();
        assert_eq!(profile.sleep_quality, SleepQuality::Fair);
        assert_eq!(profile.family_pressure, PressureLevel::Moderate);
        assert_eq!(profile.board, "other");
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut rec = record();
        rec.foundation = None;
        assert_eq!(
            Profile::try_from(rec).unwrap_err(),
            ValidationError::MissingField {
                field: "foundation"
            }
        );
    }

    #[test]
    fn out_of_range_percentage_is_rejected() {
        let mut rec = record();
        rec.qualifying_percentage = Some(104.0);
        let err = Profile::try_from(rec).unwrap_err();
        assert_eq!(err.field(), "qualifying_percentage");
    }

    #[test]
    fn non_finite_profile_number_is_rejected() {
        let mut rec = record();
        rec.target_score = Some(f64::NAN);
        assert_eq!(
            Profile::try_from(rec).unwrap_err(),
            ValidationError::NonFinite {
                field: "target_score"
            }
        );
    }

    #[test]
    fn inverted_mock_range_is_rejected() {
        let mut rec = record();
        rec.mock_score_min = Some(650.0);
        rec.mock_score_max = Some(600.0);
        assert!(matches!(
            Profile::try_from(rec),
            Err(ValidationError::InvertedRange { .. })
        ));
    }

    #[test]
    fn duplicate_subjects_are_rejected() {
        let mut rec = record();
        rec.subject_preference = vec!["physics".into(), "PHY".into()];
        assert!(matches!(
            Profile::try_from(rec),
            Err(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn sanitize_drops_malformed_telemetry() {
        let mut t = telemetry();
        t.avg_energy = Some(f64::INFINITY);
        t.consistency_score = Some(140.0);
        t.avg_test_score = Some(f64::NAN);
        t.top_mistake_category = Some("   ".into());

        let discarded = t.discarded_fields();
        assert!(discarded.contains(&"avg_energy"));
        assert!(discarded.contains(&"consistency_score"));
        assert!(discarded.contains(&"avg_test_score"));

        let clean = t.sanitized();
        assert_eq!(clean.avg_energy, None);
        assert_eq!(clean.consistency_score, None);
        assert_eq!(clean.avg_test_score, None);
        assert_eq!(clean.top_mistake_category, None);
        assert_eq!(clean.avg_stress, Some(5.5));
        assert_eq!(clean.critical_mistakes, Some(1));
    }

    #[test]
    fn wrong_typed_telemetry_values_read_as_absent() {
        let t: TelemetrySnapshot = serde_json::from_str(
            r#"{"avg_test_score": 640, "avg_energy": "high", "critical_mistakes": -1,
                "moderate_mistakes": 2, "top_mistake_category": 7, "avg_stress": null}"#,
        )
        .unwrap();
        assert_eq!(t.avg_test_score, Some(640.0));
        assert_eq!(t.avg_energy, None);
        assert_eq!(t.critical_mistakes, None);
        assert_eq!(t.moderate_mistakes, Some(2));
        assert_eq!(t.top_mistake_category, None);
        assert_eq!(t.avg_stress, None);
    }

    #[test]
    fn implausible_question_volume_is_discarded() {
        let mut t = telemetry();
        t.avg_daily_questions = Some(1.0e12);
        assert_eq!(t.discarded_fields(), vec!["avg_daily_questions"]);
        assert_eq!(t.sanitized().avg_daily_questions, None);

        t.avg_daily_questions = Some(MAX_DAILY_QUESTIONS);
        assert!(t.discarded_fields().is_empty());
    }

    #[test]
    fn empty_snapshot_detection() {
        assert!(TelemetrySnapshot::default().is_empty());
        assert!(!telemetry().is_empty());
        let only_mistakes = TelemetrySnapshot {
            critical_mistakes: Some(0),
            ..Default::default()
        };
        assert!(!only_mistakes.is_empty());
    }
}
