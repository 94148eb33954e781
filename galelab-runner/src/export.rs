//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for run reports:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: one row per pair, and one row per occurrence
//! - **Markdown**: human-readable report with a summary paragraph per pair
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use galelab_core::GaleLevel;

use crate::runner::{PairReport, RunReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunReport` to pretty JSON.
pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a `RunReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per pair.
///
/// Columns: pattern, pattern_markets, entry, entry_markets, occurrences,
/// then count/pct for sg, g1, g2, g3, g4, f, success, then roi_pct, grade.
pub fn export_results_csv(pairs: &[PairReport]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "pattern".to_string(),
        "pattern_markets".to_string(),
        "entry".to_string(),
        "entry_markets".to_string(),
        "occurrences".to_string(),
    ];
    for level in GaleLevel::ALL {
        let name = level.to_string().to_lowercase();
        header.push(format!("{name}_count"));
        header.push(format!("{name}_pct"));
    }
    header.extend(["success_count", "success_pct", "roi_pct", "grade"].map(String::from));
    wtr.write_record(&header)?;

    for p in pairs {
        let r = &p.result;
        let mut row = vec![
            r.pattern_position.to_string(),
            r.pattern_config.label(),
            r.entry_position.to_string(),
            r.entry_config.label(),
            r.total_occurrences.to_string(),
        ];
        for level in GaleLevel::ALL {
            row.push(r.count(level).to_string());
            row.push(format!("{:.2}", r.percentage(level)));
        }
        row.push(r.assertiveness.total.count.to_string());
        row.push(format!("{:.2}", r.assertiveness.total.percentage));
        row.push(format!("{:.2}", p.metrics.roi.roi));
        row.push(p.metrics.total_grade.as_str().to_string());
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per occurrence across all pairs.
///
/// Columns: pair, index, pattern_date, pattern_time, pattern_score, level,
/// resolved_date, resolved_score
pub fn export_occurrences_csv(pairs: &[PairReport]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "pair",
        "index",
        "pattern_date",
        "pattern_time",
        "pattern_score",
        "level",
        "resolved_date",
        "resolved_score",
    ])?;

    for p in pairs {
        let label = p.result.label();
        for o in &p.result.occurrences {
            let resolved = o.resolving_match();
            wtr.write_record([
                label.as_str(),
                &o.index.to_string(),
                &o.pattern_match.date.to_string(),
                &format!("{:02}:{:02}", o.pattern_match.hour, o.pattern_match.minute),
                &o.pattern_match.score(),
                &o.level.to_string(),
                &resolved.map(|m| m.date.to_string()).unwrap_or_default(),
                &resolved.map(|m| m.score()).unwrap_or_default(),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a run.
///
/// Creates a directory named `run_{timestamp}_{grid hash}_{dataset hash}/`
/// (hash prefixes) under `output_dir`. An existing directory of that name is
/// never reused; a `_2`, `_3`, ... suffix is appended instead. Contents:
/// - `manifest.json`: the full `RunReport`
/// - `results.csv`: one row per pair
/// - `occurrences.csv`: one row per pattern hit
/// - `report.md`: Markdown report
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &RunReport, output_dir: &Path) -> Result<PathBuf> {
    let grid_prefix: String = report.grid_hash.0.chars().take(8).collect();
    let data_prefix: String = report.dataset_hash.0.chars().take(8).collect();
    let base = format!(
        "run_{}_{}_{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S"),
        grid_prefix,
        data_prefix
    );
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;
    let run_dir = create_unique_dir(output_dir, &base)?;

    std::fs::write(run_dir.join("manifest.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("results.csv"), export_results_csv(&report.pairs)?)?;
    std::fs::write(
        run_dir.join("occurrences.csv"),
        export_occurrences_csv(&report.pairs)?,
    )?;
    std::fs::write(run_dir.join("report.md"), generate_report(report))?;

    tracing::info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

fn create_unique_dir(parent: &Path, base: &str) -> Result<PathBuf> {
    let mut attempt = 1u32;
    loop {
        let name = if attempt == 1 {
            base.to_string()
        } else {
            format!("{base}_{attempt}")
        };
        let dir = parent.join(name);
        match std::fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to create artifact dir: {}", dir.display()))
            }
        }
    }
}

/// Load a `RunReport` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<RunReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a run.
pub fn generate_report(report: &RunReport) -> String {
    let mut md = String::with_capacity(4096);

    md.push_str("# Pattern Backtest Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        report.first_date.as_deref().unwrap_or("-"),
        report.last_date.as_deref().unwrap_or("-")
    ));
    md.push_str(&format!("| Matches | {} |\n", report.match_count));
    md.push_str(&format!(
        "| Window starts | {} |\n",
        report.trace.window_starts
    ));
    md.push_str(&format!(
        "| Cells | {} patterns, {} entries |\n",
        report.trace.patterns, report.trace.entries
    ));
    md.push_str(&format!("| Pairs | {} |\n", report.pairs.len()));
    md.push_str(&format!(
        "| ROI simulation | stake {:.2}, odd {:.2} |\n",
        report.roi.stake, report.roi.odd
    ));
    md.push_str(&format!("| Grid Hash | {} |\n", report.grid_hash));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    md.push('\n');

    if report.pairs.is_empty() {
        md.push_str(
            "No related pairs: entries must sit below a pattern in the same column.\n",
        );
        return md;
    }

    md.push_str("## Pairs\n\n");
    for p in &report.pairs {
        md.push_str(&format_pair(p));
    }
    md
}

fn format_pair(p: &PairReport) -> String {
    let r = &p.result;
    let mut s = format!(
        "### {} ({}) -> {} ({})\n\n",
        r.pattern_position,
        r.pattern_config.label(),
        r.entry_position,
        r.entry_config.label()
    );

    s.push_str("| Level | Hits | Assertiveness |\n");
    s.push_str("| --- | ---: | ---: |\n");
    for level in GaleLevel::ALL {
        s.push_str(&format!(
            "| {} | {}/{} | {:.1}% |\n",
            level,
            r.count(level),
            r.total_occurrences,
            r.percentage(level)
        ));
    }
    s.push_str(&format!(
        "| **Total** | {}/{} | **{:.1}%** |\n\n",
        r.assertiveness.total.count, r.total_occurrences, r.assertiveness.total.percentage
    ));

    if r.total_occurrences == 0 {
        s.push_str("The pattern never opened a complete window in this period.\n\n");
        return s;
    }

    let roi = p.metrics.roi.roi;
    s.push_str(&format!(
        "Pattern occurred {} times. The entry hit without gale {:.1}% of the time \
         and within G4 {:.1}% of the time ({}). Simulated ROI: {}{:.1}%.\n\n",
        r.total_occurrences,
        r.percentage(GaleLevel::SG),
        r.assertiveness.total.percentage,
        p.metrics.total_grade.as_str(),
        if roi >= 0.0 { "+" } else { "" },
        roi
    ));
    s
}
