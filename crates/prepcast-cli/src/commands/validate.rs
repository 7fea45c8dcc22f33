//! The `prepcast validate` command.

use std::path::PathBuf;

use anyhow::Result;

use prepcast_core::config::load_config_from;
use prepcast_core::parser::{load_profile_directory, parse_profile, parse_telemetry};
use prepcast_core::PredictionEngine;

pub fn execute(
    profile_path: PathBuf,
    telemetry_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let engine = PredictionEngine::new(config)?;
    let years: Vec<String> = engine
        .rank_tables()
        .years()
        .map(|y| y.to_string())
        .collect();
    println!(
        "Config {} valid (rank tables: {})",
        engine.config().version,
        years.join(", ")
    );

    let profiles = if profile_path.is_dir() {
        load_profile_directory(&profile_path)?
    } else {
        vec![(profile_path.clone(), parse_profile(&profile_path)?)]
    };
    if profiles.is_empty() {
        anyhow::bail!("no valid profiles found in {}", profile_path.display());
    }
    for (path, profile) in &profiles {
        println!(
            "Profile valid: {} ({}, {}, attempt {})",
            path.display(),
            profile.category,
            profile.region,
            profile.attempt_number
        );
    }

    let mut total_warnings = 0;
    if let Some(path) = telemetry_path {
        let telemetry = parse_telemetry(&path)?;
        let discarded = telemetry.discarded_fields();
        for field in &discarded {
            println!("  WARNING: telemetry field '{field}' is malformed and will use its default");
        }
        total_warnings += discarded.len();
        if telemetry.is_empty() {
            println!("  WARNING: telemetry is empty; forecasts will use defaults only");
            total_warnings += 1;
        }
    }

    if total_warnings == 0 {
        println!("All inputs valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
