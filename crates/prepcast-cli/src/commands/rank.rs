//! The `prepcast rank` command.

use std::path::PathBuf;

use anyhow::Result;

use prepcast_core::config::load_config_from;
use prepcast_core::PredictionEngine;

pub fn execute(score: u16, year: Option<u16>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let engine = PredictionEngine::new(config)?;

    let max = engine.config().scoring.max_score;
    if score > max {
        anyhow::bail!("score {score} is above the maximum of {max}");
    }

    let table = engine
        .rank_tables()
        .select(year.or(engine.config().default_exam_year));
    if let Some(requested) = year.filter(|y| *y != table.year) {
        tracing::warn!("no rank table for {requested}, using {}", table.year);
    }

    println!(
        "Score {score} -> rank {} ({} table)",
        table.rank_for(score),
        table.year
    );
    Ok(())
}
