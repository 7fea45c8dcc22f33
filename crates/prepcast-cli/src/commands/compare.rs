//! The `prepcast compare` command.

use std::path::PathBuf;

use anyhow::Result;

use prepcast_core::report::ForecastReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let baseline = ForecastReport::load_json(&baseline_path)?;
    let current = ForecastReport::load_json(&current_path)?;

    let comparison = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", comparison.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        _ => {
            println!(
                "Comparison: forecast {} ({:+} points, rank {} -> {})",
                comparison.trend_label(),
                comparison.score_delta,
                comparison.baseline_rank,
                comparison.current_rank
            );
            println!(
                "  score {} -> {}, confidence {:+}",
                comparison.baseline_score, comparison.current_score, comparison.confidence_delta
            );

            let changed: Vec<_> = comparison
                .band_deltas
                .iter()
                .filter(|b| b.delta != 0)
                .collect();
            if !changed.is_empty() {
                println!("\nProbability changes:");
                for b in changed {
                    println!(
                        "  {} {}% -> {}% ({:+})",
                        b.band,
                        b.baseline.unwrap_or(0),
                        b.current.unwrap_or(0),
                        b.delta
                    );
                }
            }
        }
    }

    if fail_on_regression && comparison.has_regression() {
        std::process::exit(1);
    }

    Ok(())
}
