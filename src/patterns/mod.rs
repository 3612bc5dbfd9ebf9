//! Cross-symptom pattern detection.
//!
//! Every detector works on the mapped [`SeriesSet`] and degrades to an empty
//! result instead of failing: short series, constant series and missing
//! symptoms simply contribute nothing.

pub mod change_points;
pub mod correlation;
pub mod cycles;
pub mod outliers;

pub use change_points::{detect_change_points, ChangePoint};
pub use correlation::{calculate_correlations, CorrelationStrength, SymptomCorrelation};
pub use cycles::{cycle_confidence, detect_cycles, CyclePeriod, DetectedCycle};
pub use outliers::detect_outliers;

use crate::config::PatternConfig;
use crate::core::{round_to, SeriesSet, SymptomKind, SymptomSeries, Trend};
use crate::stats::descriptive::linear_regression;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The best-fitting long-run direction across all symptoms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverallTrend {
    pub symptom: SymptomKind,
    pub direction: Trend,
    /// R² of the linear fit, in [0, 1].
    pub strength: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub correlations: Vec<SymptomCorrelation>,
    pub cycles: Vec<DetectedCycle>,
    pub overall_trend: Option<OverallTrend>,
    pub outlier_dates: Vec<NaiveDate>,
    pub change_points: Vec<NaiveDate>,
    pub sufficient_data: bool,
}

impl PatternAnalysis {
    pub fn empty() -> Self {
        Self {
            correlations: Vec::new(),
            cycles: Vec::new(),
            overall_trend: None,
            outlier_dates: Vec::new(),
            change_points: Vec::new(),
            sufficient_data: false,
        }
    }

    pub fn has_findings(&self) -> bool {
        !self.correlations.is_empty()
            || !self.cycles.is_empty()
            || !self.outlier_dates.is_empty()
            || !self.change_points.is_empty()
    }
}

impl Default for PatternAnalysis {
    fn default() -> Self {
        Self::empty()
    }
}

pub fn detect_patterns_default(series: &SeriesSet) -> PatternAnalysis {
    detect_patterns(series, &PatternConfig::default())
}

pub fn detect_patterns(series: &SeriesSet, config: &PatternConfig) -> PatternAnalysis {
    if series.iter().all(|s| s.len() < config.min_points) {
        log::debug!(
            "Pattern detection skipped: no symptom has {} points",
            config.min_points
        );
        return PatternAnalysis::empty();
    }

    let outlier_dates = union_dates(
        series
            .iter()
            .map(|s| detect_outliers(s, config.min_points, config.iqr_multiplier)),
        config.max_outliers,
    );

    let change_points = union_dates(
        series.iter().map(|s| {
            detect_change_points(s, config.change_window, config.change_threshold)
                .into_iter()
                .map(|cp| cp.date)
                .collect()
        }),
        config.max_change_points,
    );

    PatternAnalysis {
        correlations: calculate_correlations(series, config.min_overlap),
        cycles: detect_cycles(series.iter(), config.min_cycle_confidence),
        overall_trend: overall_trend(series, config),
        outlier_dates,
        change_points,
        sufficient_data: true,
    }
}

/// Pick the symptom whose linear fit explains the most variance.
///
/// Ties keep the earlier symptom in [`SymptomKind::ALL`] order.
pub fn overall_trend(series: &SeriesSet, config: &PatternConfig) -> Option<OverallTrend> {
    series
        .iter()
        .filter(|s| s.len() >= config.min_points)
        .filter_map(|s| trend_for(s, config.stable_slope))
        .fold(None, |best: Option<OverallTrend>, candidate| match best {
            Some(current) if current.strength >= candidate.strength => Some(current),
            _ => Some(candidate),
        })
}

fn trend_for(series: &SymptomSeries, stable_slope: f64) -> Option<OverallTrend> {
    let fit = linear_regression(&series.day_offsets(), &series.values())?;
    let direction = Trend::from_change(
        series.kind.polarity(),
        fit.slope,
        fit.slope.abs() >= stable_slope,
    );

    Some(OverallTrend {
        symptom: series.kind,
        direction,
        strength: round_to(fit.r_squared, 3),
    })
}

fn union_dates(groups: impl Iterator<Item = Vec<NaiveDate>>, cap: usize) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = groups.flatten().collect();
    dates.sort_unstable();
    dates.dedup();
    dates.truncate(cap);
    dates
}
