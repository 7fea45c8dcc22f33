//! HTML forecast page.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use std::path::Path;

use anyhow::{Context, Result};

use prepcast_core::probability::ProbabilityBands;
use prepcast_core::report::ForecastReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page from a forecast report.
pub fn generate_html(report: &ForecastReport) -> String {
    let r = &report.result;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>prepcast forecast: {}</title>\n",
        html_escape(&report.display_name())
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>prepcast forecast</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\"><strong>{}</strong> | exam year {} | confidence {}% | config {} | {}</p>\n",
        html_escape(&report.display_name()),
        r.exam_year,
        r.confidence_level,
        html_escape(&r.config_version),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score and rank summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th></th><th>Worst case</th><th>Most likely</th><th>Best case</th><th>Confidence range</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    html.push_str(&format!(
        "<tr><td>Score</td><td>{}</td><td class=\"headline\">{}</td><td>{}</td><td>{} to {}</td></tr>\n",
        r.score.worst_case,
        r.score.most_likely,
        r.score.best_case,
        r.score.confidence_range.min,
        r.score.confidence_range.max
    ));
    html.push_str(&format!(
        "<tr><td>Rank</td><td>{}</td><td class=\"headline\">{}</td><td>{}</td><td>{} to {}</td></tr>\n",
        r.rank.worst_case,
        r.rank.most_likely,
        r.rank.best_case,
        r.rank.confidence_range.min,
        r.rank.confidence_range.max
    ));
    html.push_str("</tbody></table>\n");

    if !r.probabilities.is_empty() {
        html.push_str("<h2>Admission probability</h2>\n");
        html.push_str(&generate_bar_chart(&r.probabilities));
    }
    html.push_str("</section>\n");

    // Analysis
    html.push_str("<section class=\"analysis\">\n");
    html.push_str("<h2>Analysis</h2>\n");
    html.push_str(&list_block("Strengths", &r.analysis.strengths));
    html.push_str(&list_block("Critical weaknesses", &r.analysis.critical_weaknesses));
    html.push_str(&list_block("Mid-level areas", &r.analysis.mid_level_areas));
    html.push_str(&list_block("Immediate actions", &r.analysis.immediate_actions));
    html.push_str("</section>\n");

    // Roadmap
    html.push_str("<section class=\"roadmap\">\n");
    html.push_str("<h2>Roadmap</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Horizon</th><th>Target score</th><th>Hours/day</th><th>Questions/day</th><th>By subject</th><th>Focus</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for phase in r.roadmap.phases() {
        let subjects = phase
            .subject_targets
            .iter()
            .map(|t| format!("{} {}", t.subject, t.daily_questions))
            .collect::<Vec<_>>()
            .join(", ");
        let focus = phase
            .focus_areas
            .iter()
            .map(|f| html_escape(f))
            .collect::<Vec<_>>()
            .join("<br>");
        html.push_str(&format!(
            "<tr><td>{} days</td><td>{}</td><td>{:.1}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            phase.horizon_days,
            phase.target_score,
            phase.study_hours_per_day,
            phase.daily_questions,
            subjects,
            focus
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Risks
    html.push_str("<section class=\"risks\">\n");
    html.push_str("<h2>Risks</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Severity</th><th>Risk</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    let tiers = [
        ("high", &r.risks.high_risk),
        ("medium", &r.risks.medium_risk),
        ("low", &r.risks.low_risk),
    ];
    for (tier, risks) in tiers {
        for risk in risks {
            html.push_str(&format!(
                "<tr class=\"{tier}\"><td>{tier}</td><td>{}</td></tr>\n",
                html_escape(risk)
            ));
        }
    }
    html.push_str("</tbody></table>\n");
    html.push_str(&list_block("Mitigation", &r.risks.mitigation_strategies));
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML page to a file.
pub fn write_html_report(report: &ForecastReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn list_block(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut block = format!("<h3>{}</h3>\n<ul>\n", html_escape(title));
    for item in items {
        block.push_str(&format!("<li>{}</li>\n", html_escape(item)));
    }
    block.push_str("</ul>\n");
    block
}

fn generate_bar_chart(bands: &ProbabilityBands) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = bands.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (band, pct)) in bands.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let pct = usize::from((*pct).min(100));
        let width = pct * max_width / 100;

        let color = if pct >= 75 {
            "#22c55e"
        } else if pct >= 40 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&band.replace('_', " "))
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            pct
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --high: #fde2e2; --medium: #fef9c3; --low: #dcfce7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --high: #7f1d1d; --medium: #713f12; --low: #064e3b; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.headline { font-weight: bold; }
.high { background: var(--high); }
.medium { background: var(--medium); }
.low { background: var(--low); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use prepcast_core::{predict, Profile, ProfileRecord, TelemetrySnapshot};

    fn make_test_report() -> ForecastReport {
        let record = ProfileRecord {
            category: Some("ews".into()),
            region: Some("east".into()),
            coaching_channel: Some("<script>alert(1)</script>".into()),
            attempt_number: Some(3),
            qualifying_percentage: Some(85.0),
            foundation: Some("average".into()),
            mock_score_min: Some(560.0),
            mock_score_max: Some(620.0),
            target_score: Some(650.0),
            current_study_hours: Some(6.0),
            target_study_hours: Some(8.0),
            current_daily_questions: Some(120),
            target_daily_questions: Some(180),
            subject_preference: vec!["chemistry".into(), "physics".into()],
            ..Default::default()
        };
        let profile = Profile::try_from(record).unwrap();
        let telemetry = TelemetrySnapshot {
            avg_test_score: Some(590.0),
            avg_energy: Some(4.2),
            critical_mistakes: Some(2),
            top_mistake_category: Some("genetics & evolution".into()),
            ..Default::default()
        };

        ForecastReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            label: Some("mock <week 6>".into()),
            result: predict(&profile, Some(&telemetry)).unwrap(),
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("government college"));
        assert!(html.contains("180 days"));
        assert!(html.contains("Raw JSON Data"));
        assert!(html.contains(&report.result.score.most_likely.to_string()));
    }

    #[test]
    fn html_escapes_untrusted_text() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("mock &lt;week 6&gt;"));
        assert!(html.contains("genetics &amp; evolution"));
        assert!(!html.contains("<week 6>"));
    }

    #[test]
    fn high_risks_are_tagged() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("<tr class=\"high\"><td>high</td><td>Chronic low energy"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("forecast.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
