//! The `prepcast predict` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use prepcast_core::config::load_config_from;
use prepcast_core::parser::{parse_profile, parse_telemetry};
use prepcast_core::report::ForecastReport;
use prepcast_core::PredictionEngine;
use prepcast_report::html::{generate_html, write_html_report};

pub fn execute(
    profile_path: PathBuf,
    telemetry_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    label: Option<String>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let engine = PredictionEngine::new(config).context("invalid engine configuration")?;

    let profile = parse_profile(&profile_path)?;
    let telemetry = telemetry_path.as_deref().map(parse_telemetry).transpose()?;

    let result = engine
        .predict(&profile, telemetry.as_ref())
        .with_context(|| format!("cannot forecast {}", profile_path.display()))?;
    tracing::debug!(score = result.score.most_likely, "forecast ready");

    let report = ForecastReport::new(label, result);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "html" => {
            if output.is_none() {
                println!("{}", generate_html(&report));
            }
        }
        "text" => print_summary(&report),
        other => anyhow::bail!("unknown format '{other}': expected text, json, markdown or html"),
    }

    if let Some(dir) = output {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;

        let path = dir.join("forecast.json");
        report.save_json(&path)?;
        eprintln!("Forecast saved to: {}", path.display());

        if format == "html" {
            let path = dir.join("forecast.html");
            write_html_report(&report, &path)?;
            eprintln!("HTML report: {}", path.display());
        }
    }

    Ok(())
}

fn print_summary(report: &ForecastReport) {
    use comfy_table::{Cell, Table};

    let r = &report.result;

    let mut table = Table::new();
    table.set_header(vec!["", "Worst case", "Most likely", "Best case", "Confidence range"]);
    table.add_row(vec![
        Cell::new("Score"),
        Cell::new(r.score.worst_case),
        Cell::new(r.score.most_likely),
        Cell::new(r.score.best_case),
        Cell::new(format!(
            "{}-{}",
            r.score.confidence_range.min, r.score.confidence_range.max
        )),
    ]);
    table.add_row(vec![
        Cell::new("Rank"),
        Cell::new(r.rank.worst_case),
        Cell::new(r.rank.most_likely),
        Cell::new(r.rank.best_case),
        Cell::new(format!(
            "{}-{}",
            r.rank.confidence_range.min, r.rank.confidence_range.max
        )),
    ]);

    println!(
        "Forecast for exam year {} (config {}), confidence {}%",
        r.exam_year, r.config_version, r.confidence_level
    );
    println!("{table}");

    let mut bands = Table::new();
    bands.set_header(vec!["Band", "Probability"]);
    for (band, pct) in &r.probabilities {
        bands.add_row(vec![Cell::new(band), Cell::new(format!("{pct}%"))]);
    }
    println!("{bands}");

    let sections = [
        ("Strengths", &r.analysis.strengths),
        ("Critical weaknesses", &r.analysis.critical_weaknesses),
        ("Immediate actions", &r.analysis.immediate_actions),
        ("High risks", &r.risks.high_risk),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        println!("\n{title}:");
        for item in items {
            println!("  - {item}");
        }
    }
}
