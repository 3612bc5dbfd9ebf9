//! Plain-text renderings of analysis results.
//!
//! The output is deterministic and free of terminal escapes; callers that
//! want color wrap these lines themselves (see [`crate::io::output`]).

pub mod color;

pub use color::ColorMode;

use crate::patterns::PatternAnalysis;
use crate::risk::RiskAssessment;
use crate::stats::StatisticsSummary;

/// Headline with mean and trend, then an indented line with the spread and,
/// once a trend could be computed, the half means and the daily slope.
pub fn format_statistics_summary(summary: &StatisticsSummary) -> String {
    let label = format!("{} ({})", summary.symptom, summary.symptom.description());

    if summary.count == 0 {
        return format!("{}: no data", label);
    }

    let head = format!(
        "{}: mean {:.2} over {} {}",
        label,
        summary.mean,
        summary.count,
        if summary.count == 1 { "entry" } else { "entries" }
    );

    let head = if summary.sufficient_data {
        format!(
            "{}, {} ({:+.1}%)",
            head, summary.trend, summary.percent_change
        )
    } else {
        format!("{}, not enough data for a trend", head)
    };

    let mut details = vec![format!(
        "median {:.2}, spread {:.2} ({:.2} to {:.2})",
        summary.median, summary.std_dev, summary.min, summary.max
    )];
    if let (Some(first), Some(second)) = (summary.first_half_mean, summary.second_half_mean) {
        details.push(format!("halves {:.2} -> {:.2}", first, second));
    }
    if let Some(slope) = summary.slope {
        details.push(format!("slope {:+.2}/day", slope));
    }

    format!("{}\n  {}", head, details.join(", "))
}

pub fn format_pattern_summary(patterns: &PatternAnalysis) -> String {
    if !patterns.sufficient_data {
        return "Not enough data to detect patterns.".to_string();
    }

    let mut out = String::new();

    if !patterns.correlations.is_empty() {
        out.push_str("Correlations:\n");
        for c in &patterns.correlations {
            out.push_str(&format!(
                "  {}: {:.3} ({}, {} shared days)\n",
                c.pair_label(),
                c.coefficient,
                c.strength().as_str(),
                c.overlap
            ));
        }
    }

    if !patterns.cycles.is_empty() {
        out.push_str("Cycles:\n");
        for cycle in &patterns.cycles {
            out.push_str(&format!(
                "  {}: {} (confidence {:.2})\n",
                cycle.symptom, cycle.period, cycle.confidence
            ));
        }
    }

    if let Some(trend) = &patterns.overall_trend {
        out.push_str(&format!(
            "Overall trend: {} {} (R\u{b2} {:.2})\n",
            trend.symptom, trend.direction, trend.strength
        ));
    }

    if !patterns.outlier_dates.is_empty() {
        out.push_str(&format!("Unusual days: {}\n", join_dates(&patterns.outlier_dates)));
    }

    if !patterns.change_points.is_empty() {
        out.push_str(&format!("Changes around: {}\n", join_dates(&patterns.change_points)));
    }

    if out.is_empty() {
        return "No notable patterns detected.".to_string();
    }

    out.truncate(out.trim_end().len());
    out
}

pub fn format_risk_summary(risk: &RiskAssessment) -> String {
    let mut out = format!("Risk level: {} (score: {})", risk.level, risk.score);

    if risk.insufficient_data {
        out.push_str("\n  Not enough entries for a reliable assessment.");
    } else if risk.flags.is_empty() {
        out.push_str("\n  No risk rules triggered.");
    } else {
        for flag in &risk.flags {
            out.push_str(&format!("\n  - {}: {}", flag, flag.description()));
        }
    }

    out
}

fn join_dates(dates: &[chrono::NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
