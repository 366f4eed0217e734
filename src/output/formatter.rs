use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::assessment::{AssessmentReport, DiseaseScore};
use crate::premium::PremiumQuote;
use crate::scoring::{Disease, ScoreBreakdown, ScoreResult, ScoreSource};

/// Bar width used when stdout is not a terminal.
const DEFAULT_BAR_WIDTH: usize = 20;
const MAX_BAR_WIDTH: usize = 40;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a probability as a percentage with one decimal ("46.0%")
pub fn format_probability(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// Format an amount in rupees with Indian digit grouping ("₹1,23,456")
pub fn format_inr(amount: u32) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{}", digits);
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("₹{},{}", groups.join(","), tail)
}

fn source_label(source: ScoreSource) -> &'static str {
    match source {
        ScoreSource::RuleBased => "rules",
        ScoreSource::Model => "model",
        ScoreSource::Fallback => "rules, model failed",
    }
}

/// Get terminal width, defaulting to None for pipes
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

fn bar_width() -> usize {
    get_terminal_width()
        .map(|w| (w / 3).clamp(10, MAX_BAR_WIDTH))
        .unwrap_or(DEFAULT_BAR_WIDTH)
}

/// Fixed-width bar for a probability ("[#####---------------]")
pub fn format_bar(p: f64, width: usize) -> String {
    let filled = ((p.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn colorize_risk(text: &str, p: f64, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    if p < 0.3 {
        text.green().to_string()
    } else if p < 0.6 {
        text.yellow().to_string()
    } else {
        text.red().bold().to_string()
    }
}

/// One line per disease: name, bar, percentage, source
pub fn format_score_line(disease: Disease, result: &ScoreResult, use_colors: bool) -> String {
    let pct = format!("{:>6}", format_probability(result.score));
    let bar = format_bar(result.score, bar_width());
    let source = format!("({})", source_label(result.source));
    if use_colors {
        format!(
            "{:<15} {} {}  {}",
            disease.title().bold(),
            colorize_risk(&bar, result.score, true),
            colorize_risk(&pct, result.score, true),
            source.dimmed()
        )
    } else {
        format!("{:<15} {} {}  {}", disease.title(), bar, pct, source)
    }
}

/// Per-factor contributions, one indented line each
pub fn format_breakdown(breakdown: &ScoreBreakdown, use_colors: bool) -> String {
    let mut lines: Vec<String> = breakdown
        .factors
        .iter()
        .map(|f| {
            let line = format!(
                "    {:<22} {:>8}  {}",
                f.label,
                trim_number(f.value),
                f.description
            );
            if use_colors && f.points == 0.0 {
                line.dimmed().to_string()
            } else {
                line
            }
        })
        .collect();

    lines.push(format!(
        "    raw {:.2} / {} = {:.3}, jitter {:+.3}",
        breakdown.raw_total,
        trim_number(breakdown.normalizer),
        breakdown.normalized,
        breakdown.jitter
    ));
    lines.join("\n")
}

fn trim_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Tier and premium range
pub fn format_quote(quote: &PremiumQuote, use_colors: bool) -> String {
    let range = format!(
        "{} - {} per year",
        format_inr(quote.min_premium),
        format_inr(quote.max_premium)
    );
    if use_colors {
        format!(
            "Premium tier: {} ({}% risk)\nEstimated premium: {}",
            quote.tier.label().bold(),
            quote.risk_percent,
            range.cyan()
        )
    } else {
        format!(
            "Premium tier: {} ({}% risk)\nEstimated premium: {}",
            quote.tier.label(),
            quote.risk_percent,
            range
        )
    }
}

/// Single-disease result, with the breakdown when `verbose`
pub fn format_score_result(
    disease: Disease,
    result: &ScoreResult,
    verbose: bool,
    use_colors: bool,
) -> String {
    let mut out = format_score_line(disease, result, use_colors);
    if verbose {
        if let Some(ref breakdown) = result.breakdown {
            out.push('\n');
            out.push_str(&format_breakdown(breakdown, use_colors));
        }
    }
    out
}

fn format_detail(detail: &DiseaseScore, verbose: bool, use_colors: bool) -> String {
    format_score_result(detail.disease, &detail.result, verbose, use_colors)
}

/// Full assessment report
pub fn format_report(report: &AssessmentReport, verbose: bool, use_colors: bool) -> String {
    let mut sections = Vec::new();

    for detail in &report.details {
        sections.push(format_detail(detail, verbose, use_colors));
    }

    let composite = &report.composite;
    let mut composite_line = format!(
        "{:<15} {} {:>6}",
        "Composite",
        format_bar(composite.value, bar_width()),
        format_probability(composite.value)
    );
    if use_colors {
        composite_line = colorize_risk(&composite_line, composite.value, true);
    }
    sections.push(String::new());
    sections.push(composite_line);
    if composite.override_applied {
        let note = format!(
            "  high heart or kidney risk raised the composite from {}",
            format_probability(composite.weighted_mean)
        );
        sections.push(if use_colors {
            note.red().to_string()
        } else {
            note
        });
    }

    sections.push(String::new());
    sections.push(format_quote(&report.quote, use_colors));

    if verbose {
        sections.push(format!(
            "Assessed at {}",
            report.assessed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    sections.join("\n")
}

/// Pretty JSON for scripting
pub fn format_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| anyhow::anyhow!("Failed to serialize output: {}", e))
}
