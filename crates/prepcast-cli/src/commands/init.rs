//! The `prepcast init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    for (name, content) in [
        ("prepcast.toml", SAMPLE_CONFIG),
        ("profile.toml", SAMPLE_PROFILE),
        ("telemetry.toml", SAMPLE_TELEMETRY),
    ] {
        if Path::new(name).exists() {
            println!("{name} already exists, skipping.");
        } else {
            std::fs::write(name, content)?;
            println!("Created {name}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Fill in profile.toml with your own details");
    println!("  2. Run: prepcast validate --profile profile.toml --telemetry telemetry.toml");
    println!("  3. Run: prepcast predict --profile profile.toml --telemetry telemetry.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# prepcast configuration
# Every key is optional; omitted keys keep the built-in values.

version = "2025.1"
# default_exam_year = 2025

[scoring]
max_score = 720
min_floor = 600
case_margin = 25
confidence_spread = 15

[confidence]
base = 85
max = 97

[advisor]
recommended_sleep_hours = 7.0
"#;

const SAMPLE_PROFILE: &str = r#"[profile]
category = "general"
region = "north"
coaching_channel = "self-study"
attempt_number = 1
preparation_years = 1
qualifying_percentage = 88.0
board = "cbse"
foundation = "good"
mock_score_min = 560
mock_score_max = 620
target_score = 660
current_study_hours = 6
target_study_hours = 8
current_daily_questions = 120
target_daily_questions = 200
sleep_hours = 7
sleep_quality = "good"
subject_preference = ["biology", "chemistry", "physics"]
family_pressure = "moderate"
"#;

const SAMPLE_TELEMETRY: &str = r#"[telemetry]
avg_test_score = 600
best_test_score = 628
avg_daily_questions = 130
consistency_score = 75
improvement_trend = 3
critical_mistakes = 2
moderate_mistakes = 4
top_mistake_category = "electrochemistry"
avg_energy = 7.0
avg_stress = 6.0
"#;
