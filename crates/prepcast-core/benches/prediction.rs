use criterion::{black_box, criterion_group, criterion_main, Criterion};

use prepcast_core::rank_table::RankTable;
use prepcast_core::{predict, Profile, ProfileRecord, TelemetrySnapshot};

fn make_profile() -> Profile {
    let record = ProfileRecord {
        category: Some("general".into()),
        region: Some("south".into()),
        coaching_channel: Some("bench".into()),
        attempt_number: Some(2),
        qualifying_percentage: Some(90.0),
        foundation: Some("good".into()),
        mock_score_min: Some(600.0),
        mock_score_max: Some(660.0),
        target_score: Some(690.0),
        current_study_hours: Some(7.0),
        target_study_hours: Some(9.0),
        current_daily_questions: Some(150),
        target_daily_questions: Some(220),
        low_energy_days: vec!["day 1".into()],
        best_time_slots: vec!["morning".into()],
        subject_preference: vec!["biology".into(), "chemistry".into(), "physics".into()],
        lifestyle_tags: vec!["nutrition".into()],
        ..Default::default()
    };
    Profile::try_from(record).unwrap()
}

fn make_telemetry() -> TelemetrySnapshot {
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

fn bench_predict(c: &mut Criterion) {
    let profile = make_profile();
    let telemetry = make_telemetry();
    let mut group = c.benchmark_group("predict");

    group.bench_function("full_telemetry", |b| {
        b.iter(|| predict(black_box(&profile), black_box(Some(&telemetry))))
    });

    group.bench_function("no_telemetry", |b| {
        b.iter(|| predict(black_box(&profile), black_box(None)))
    });

    group.finish();
}

fn bench_rank_for(c: &mut Criterion) {
    let table = RankTable::builtin_2025();

    c.bench_function("rank_for_full_domain", |b| {
        b.iter(|| {
            (0..=720u16)
                .map(|score| table.rank_for(black_box(score)))
                .max()
        })
    });
}

criterion_group!(benches, bench_predict, bench_rank_for);
criterion_main!(benches);
