//! Property tests over generated profiles and telemetry.

use proptest::option;
use proptest::prelude::*;

use prepcast_core::model::{Category, FoundationStrength, PressureLevel, Region, Subject};
use prepcast_core::probability::{default_bands, probabilities_for};
use prepcast_core::rank_table::RankTable;
use prepcast_core::{predict, Profile, ProfileRecord, TelemetrySnapshot};

fn profile_strategy() -> impl Strategy<Value = Profile> {
    let identity = (
        prop::sample::select(Category::ALL.to_vec()),
        prop::sample::select(Region::ALL.to_vec()),
        prop::sample::select(FoundationStrength::ALL.to_vec()),
        prop::sample::select(PressureLevel::ALL.to_vec()),
        1u8..=10,
        0.0f64..=100.0,
    );
    let targets = (
        (0.0f64..=720.0, 0.0f64..=720.0),
        0.0f64..=720.0,
        (0.0f64..=24.0, 0.0f64..=24.0),
        (0u32..=2000, 0u32..=2000),
        prop::sample::subsequence(Subject::ALL.to_vec(), 0..=3),
        any::<bool>(),
    );
    (identity, targets).prop_map(|(identity, targets)| {
        let (category, region, foundation, pressure, attempt, pct) = identity;
        let (mock, target, hours, qs, subjects, tagged) = targets;
        let (lo, hi) = (mock.0.min(mock.1), mock.0.max(mock.1));
        let tags = if tagged {
            vec!["fitness".to_string()]
        } else {
            vec![]
        };
        let record = ProfileRecord {
            category: Some(category.to_string()),
            region: Some(region.to_string()),
            coaching_channel: Some("generated".into()),
            attempt_number: Some(attempt),
            qualifying_percentage: Some(pct),
            foundation: Some(foundation.to_string()),
            mock_score_min: Some(lo),
            mock_score_max: Some(hi),
            target_score: Some(target),
            current_study_hours: Some(hours.0),
            target_study_hours: Some(hours.1),
            current_daily_questions: Some(qs.0),
            target_daily_questions: Some(qs.1),
            subject_preference: subjects.iter().map(|s| s.to_string()).collect(),
            lifestyle_tags: tags.clone(),
            low_energy_days: tags,
            family_pressure: Some(pressure.to_string()),
            ..Default::default()
        };
        Profile::try_from(record).expect("generated profile is valid")
    })
}

/// Telemetry including out-of-domain and non-finite values.
fn telemetry_strategy() -> impl Strategy<Value = TelemetrySnapshot> {
    let wild = || {
        option::of(prop_oneof![
            8 => -50.0f64..800.0,
            1 => Just(f64::NAN),
            1 => Just(f64::INFINITY),
        ])
    };
    (
        (wild(), wild(), wild(), wild(), wild()),
        (option::of(0u32..10), option::of(0u32..10)),
        (wild(), wild()),
        option::of("[a-z ]{0,12}"),
    )
        .prop_map(|(scores, mistakes, wellbeing, category)| {
            let (avg, best, qs, consistency, trend) = scores;
            let (critical, moderate) = mistakes;
            let (energy, stress) = wellbeing;
            TelemetrySnapshot {
                avg_test_score: avg,
                best_test_score: best,
                avg_daily_questions: qs,
                consistency_score: consistency,
                improvement_trend: trend,
                critical_mistakes: critical,
                moderate_mistakes: moderate,
                top_mistake_category: category,
                avg_energy: energy,
                avg_stress: stress,
            }
        })
}

proptest! {
    #[test]
    fn score_and_rank_cases_are_ordered(
        profile in profile_strategy(),
        telemetry in option::of(telemetry_strategy()),
    ) {
        let result = predict(&profile, telemetry.as_ref()).unwrap();
        let s = result.score;
        prop_assert!(s.worst_case <= s.most_likely && s.most_likely <= s.best_case);
        prop_assert!(s.best_case <= 720);
        prop_assert!(s.confidence_range.min <= s.confidence_range.max);

        let r = result.rank;
        prop_assert!(r.best_case >= 1);
        prop_assert!(r.best_case <= r.most_likely && r.most_likely <= r.worst_case);
        prop_assert!(r.confidence_range.min <= r.confidence_range.max);
    }

    #[test]
    fn confidence_stays_in_bounds(
        profile in profile_strategy(),
        telemetry in option::of(telemetry_strategy()),
    ) {
        let result = predict(&profile, telemetry.as_ref()).unwrap();
        prop_assert!((85..=97).contains(&result.confidence_level));
        for pct in result.probabilities.values() {
            prop_assert!(*pct <= 100);
        }
    }

    #[test]
    fn prediction_is_deterministic(
        profile in profile_strategy(),
        telemetry in option::of(telemetry_strategy()),
    ) {
        let a = serde_json::to_string(&predict(&profile, telemetry.as_ref()).unwrap()).unwrap();
        let b = serde_json::to_string(&predict(&profile, telemetry.as_ref()).unwrap()).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn rank_is_order_reversing(a in 0u16..=720, b in 0u16..=720) {
        let table = RankTable::builtin_2025();
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        prop_assert!(table.rank_for(hi) <= table.rank_for(lo));
    }

    #[test]
    fn probability_bands_never_fall_as_score_rises(a in 0u16..=720, b in 0u16..=720) {
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        let high = probabilities_for(hi, &default_bands());
        let low = probabilities_for(lo, &default_bands());
        for (band, pct) in &high {
            prop_assert!(*pct <= 100);
            prop_assert!(*pct >= low[band]);
        }
    }
}
