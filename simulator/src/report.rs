//! Presentation adapters: plain text, JSON, and CSV views of a run.
//!
//! The engine returns plain numbers; all formatting (decimal places,
//! percentages, bar charts) lives here.

use std::path::Path;
use std::str::FromStr;

use crate::constants::HISTOGRAM_BAR_WIDTH;
use crate::error::{Result, SimulationError};
use crate::simulation::{Histogram, SimulationRun};
use crate::types::ThresholdMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
}

impl FromStr for ReportFormat {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            _ => Err(SimulationError::invalid(
                "format",
                s,
                "expected text, json, or csv",
            )),
        }
    }
}

pub fn render(run: &SimulationRun, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(run)),
        ReportFormat::Json => render_json(run),
        ReportFormat::Csv => Ok(render_csv(&run.summary.histogram)),
    }
}

fn percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

/// Human-readable report: parameters, observed vs. closed-form values,
/// then the histogram.
pub fn render_text(run: &SimulationRun) -> String {
    let params = &run.scenario.parameters;
    let stats = &run.summary;
    let theory = &run.theory;
    let threshold = stats.threshold;
    let mode = run.scenario.mode;

    let seed = params
        .seed
        .map(|s| s.to_string())
        .unwrap_or_else(|| "entropy".to_string());

    let mut out = String::new();
    out += &format!("Critical failure simulation: {}\n", run.scenario.name);
    out += &format!(
        "  Trials per version:   {} ({} features x {} deploys)\n",
        run.trials, params.features_per_version, params.deploys_per_version
    );
    out += &format!(
        "  Failure probability:  {}\n",
        percent(params.failure_probability)
    );
    out += &format!("  Simulated versions:   {}\n", stats.count);
    out += &format!("  Seed:                 {}\n", seed);
    out += &format!("  Method:               {}\n", run.method);
    out += "\n";
    out += &format!("{:<28}{:>12}{:>12}\n", "Results:", "observed", "theory");
    out += &format!(
        "{:<28}{:>12.2}{:>12.2}\n",
        "  Mean failures per version", stats.mean, theory.mean()
    );
    out += &format!(
        "{:<28}{:>12.2}{:>12.2}\n",
        "  Standard deviation", stats.std_dev, theory.std_dev()
    );
    // Both readings of "too many", the scenario's own first.
    let other = match mode {
        ThresholdMode::Exceeds => ThresholdMode::AtLeast,
        ThresholdMode::AtLeast => ThresholdMode::Exceeds,
    };
    for m in [mode, other] {
        out += &format!(
            "{:<28}{:>12}{:>12}\n",
            format!("  P(failures {} {})", m.symbol(), threshold),
            percent(stats.prob_above(m)),
            percent(theory.prob_over(threshold, m))
        );
    }
    out += &format!(
        "{:<28}{:>12}{:>12}\n",
        "  P(no failures)",
        percent(stats.prob_zero),
        percent(theory.prob_zero())
    );
    out += &format!(
        "  Min / median / max:       {} / {} / {}\n",
        stats.min, stats.median, stats.max
    );
    out += &format!(
        "  Elapsed:                  {:.1} ms\n",
        run.elapsed.as_secs_f64() * 1000.0
    );
    out += "\nDistribution of critical failures per version:\n";
    out += &render_histogram(&stats.histogram, HISTOGRAM_BAR_WIDTH);
    out
}

/// One row per failure count, bar scaled to the tallest bin, count label
/// on every non-empty bin.
pub fn render_histogram(hist: &Histogram, width: usize) -> String {
    let tallest = hist.bins().iter().map(|b| b.count).max().unwrap_or(0);
    let label_width = hist
        .max_failures()
        .map(|m| m.to_string().len())
        .unwrap_or(1);

    let mut out = String::new();
    for bin in hist.bins() {
        let bar_len = if tallest == 0 {
            0
        } else {
            ((bin.count as f64 / tallest as f64) * width as f64).round() as usize
        };
        let bar = "#".repeat(bar_len);
        if bin.count > 0 {
            out += &format!(
                "{:>w$} | {} {}\n",
                bin.failures,
                bar,
                bin.count,
                w = label_width
            );
        } else {
            out += &format!("{:>w$} |\n", bin.failures, w = label_width);
        }
    }
    out
}

/// `failures,count,frequency` with a header row.
pub fn render_csv(hist: &Histogram) -> String {
    let mut out = String::from("failures,count,frequency\n");
    for bin in hist.bins() {
        out += &format!(
            "{},{},{:.6}\n",
            bin.failures,
            bin.count,
            hist.relative_frequency(bin.failures)
        );
    }
    out
}

pub fn render_json(run: &SimulationRun) -> Result<String> {
    Ok(serde_json::to_string_pretty(run)?)
}

/// Side-by-side table of several runs (one row each).
pub fn render_comparison(runs: &[SimulationRun]) -> String {
    let mut out = format!(
        "{:<12}{:>8}{:>10}{:>8}{:>10}{:>10}{:>14}{:>12}\n",
        "scenario", "trials", "versions", "p", "mean", "std dev", "P(too many)", "P(zero)"
    );
    for run in runs {
        let over = format!(
            "{} {}",
            run.scenario.mode.symbol(),
            percent(run.prob_over_threshold())
        );
        out += &format!(
            "{:<12}{:>8}{:>10}{:>8}{:>10.2}{:>10.2}{:>14}{:>12}\n",
            run.scenario.name,
            run.trials,
            run.summary.count,
            percent(run.scenario.parameters.failure_probability),
            run.summary.mean,
            run.summary.std_dev,
            over,
            percent(run.summary.prob_zero)
        );
    }
    out
}

/// Write the JSON report, creating parent directories.
pub fn save_report(run: &SimulationRun, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render_json(run)?)?;
    tracing::info!(path = %path.display(), "report saved");
    Ok(())
}
