//! Per-symptom statistics over a history window.
//!
//! The trend is derived by splitting the series chronologically into two
//! halves and comparing their means. With `mid = count / 2` the first half is
//! `[0, mid)` and the second half is `[mid, count)`, so for odd counts the
//! middle point belongs to the later half.

pub mod descriptive;

use crate::config::StatisticsConfig;
use crate::core::{round_to, SeriesSet, SymptomKind, SymptomSeries, Trend};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percent change reported when the first half averages zero but the second does not.
pub const MAX_PERCENT_CHANGE: f64 = 100.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub symptom: SymptomKind,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub trend: Trend,
    /// `(second_half_mean - first_half_mean) / first_half_mean`, in percent.
    pub percent_change: f64,
    pub first_half_mean: Option<f64>,
    pub second_half_mean: Option<f64>,
    /// Least-squares slope in scale points per day.
    pub slope: Option<f64>,
    pub sufficient_data: bool,
}

impl StatisticsSummary {
    /// Summary for a symptom with no usable observations.
    pub fn empty(symptom: SymptomKind) -> Self {
        Self {
            symptom,
            count: 0,
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            trend: Trend::Stable,
            percent_change: 0.0,
            first_half_mean: None,
            second_half_mean: None,
            slope: None,
            sufficient_data: false,
        }
    }
}

/// Compute statistics using the default trend threshold.
pub fn compute_statistics(series: &SymptomSeries, min_samples: usize) -> StatisticsSummary {
    let config = StatisticsConfig {
        min_samples,
        ..StatisticsConfig::default()
    };
    compute_statistics_with(series, &config)
}

pub fn compute_statistics_with(
    series: &SymptomSeries,
    config: &StatisticsConfig,
) -> StatisticsSummary {
    let values = series.values();
    let count = values.len();

    if count == 0 {
        return StatisticsSummary::empty(series.kind);
    }

    let mut summary = StatisticsSummary {
        count,
        mean: round_to(descriptive::mean(&values), 2),
        median: round_to(descriptive::median(&values), 2),
        std_dev: round_to(descriptive::std_dev(&values), 2),
        min: round_to(descriptive::min(&values), 2),
        max: round_to(descriptive::max(&values), 2),
        ..StatisticsSummary::empty(series.kind)
    };

    // Both halves need at least one point, whatever the configured minimum.
    let min_samples = config.min_samples.max(2);
    if count < min_samples {
        log::debug!(
            "{}: insufficient data for trend ({} < {})",
            series.kind,
            count,
            min_samples
        );
        return summary;
    }

    let mid = count / 2;
    let first = descriptive::mean(&values[..mid]);
    let second = descriptive::mean(&values[mid..]);
    let percent_change = percent_change(first, second);
    let significant = percent_change.abs() > config.trend_threshold_pct;

    summary.trend = Trend::from_change(series.kind.polarity(), second - first, significant);
    summary.percent_change = round_to(percent_change, 2);
    summary.first_half_mean = Some(round_to(first, 2));
    summary.second_half_mean = Some(round_to(second, 2));
    summary.slope = descriptive::linear_regression(&series.day_offsets(), &values)
        .map(|fit| round_to(fit.slope, 4));
    summary.sufficient_data = true;
    summary
}

/// Relative change between half means, guarded against a zero baseline.
pub fn percent_change(first_mean: f64, second_mean: f64) -> f64 {
    if first_mean == 0.0 {
        if second_mean == 0.0 {
            0.0
        } else {
            MAX_PERCENT_CHANGE.copysign(second_mean)
        }
    } else {
        (second_mean - first_mean) / first_mean * 100.0
    }
}

/// Statistics for every tracked symptom, including ones with no data.
pub fn compute_all_statistics(
    series: &SeriesSet,
    config: &StatisticsConfig,
) -> BTreeMap<SymptomKind, StatisticsSummary> {
    series
        .iter()
        .map(|s| (s.kind, compute_statistics_with(s, config)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    fn series(kind: SymptomKind, values: &[f64]) -> SymptomSeries {
        SymptomSeries::daily(kind, start(), values)
    }

    #[test]
    fn test_rest_drop_is_worsening() {
        let summary = compute_statistics(
            &series(SymptomKind::Rest, &[8.0, 8.0, 8.0, 2.0, 2.0, 2.0]),
            3,
        );

        assert_eq!(summary.trend, Trend::Worsening);
        assert_eq!(summary.percent_change, -75.0);
        assert_eq!(summary.count, 6);
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.first_half_mean, Some(8.0));
        assert_eq!(summary.second_half_mean, Some(2.0));
    }

    #[test]
    fn test_severity_rise_is_worsening_and_drop_improving() {
        let rising = compute_statistics(&series(SymptomKind::Climate, &[2.0, 2.0, 6.0, 6.0]), 3);
        assert_eq!(rising.trend, Trend::Worsening);
        assert_eq!(rising.percent_change, 200.0);

        let falling = compute_statistics(&series(SymptomKind::Clarity, &[8.0, 8.0, 4.0, 4.0]), 3);
        assert_eq!(falling.trend, Trend::Improving);
        assert_eq!(falling.percent_change, -50.0);
    }

    #[test]
    fn test_small_change_is_stable() {
        let summary = compute_statistics(&series(SymptomKind::Climate, &[5.0, 5.0, 5.4, 5.4]), 3);
        assert_eq!(summary.trend, Trend::Stable);
        assert_eq!(summary.percent_change, 8.0);
    }

    #[test]
    fn test_insufficient_data_forces_stable() {
        let summary = compute_statistics(&series(SymptomKind::Climate, &[1.0, 9.0]), 3);
        assert_eq!(summary.trend, Trend::Stable);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.percent_change, 0.0);
        assert!(!summary.sufficient_data);
        assert_eq!(summary.first_half_mean, None);
        assert_eq!(summary.mean, 5.0);
    }

    #[test]
    fn test_odd_count_puts_middle_point_in_later_half() {
        // first half = [4], second half = [4, 10]
        let summary = compute_statistics(&series(SymptomKind::Climate, &[4.0, 4.0, 10.0]), 3);
        assert_eq!(summary.first_half_mean, Some(4.0));
        assert_eq!(summary.second_half_mean, Some(7.0));
        assert_eq!(summary.percent_change, 75.0);
        assert_eq!(summary.trend, Trend::Worsening);
    }

    #[test]
    fn test_zero_baseline_percent_change() {
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(0.0, 3.0), MAX_PERCENT_CHANGE);

        let summary = compute_statistics(&series(SymptomKind::Climate, &[0.0, 0.0, 4.0, 4.0]), 3);
        assert_eq!(summary.percent_change, 100.0);
        assert_eq!(summary.trend, Trend::Worsening);

        let flat = compute_statistics(&series(SymptomKind::Climate, &[0.0; 6]), 3);
        assert_eq!(flat.percent_change, 0.0);
        assert_eq!(flat.trend, Trend::Stable);
    }

    #[test]
    fn test_missing_symptom_yields_empty_summary() {
        let summary = compute_statistics(&SymptomSeries::empty(SymptomKind::Clarity), 3);
        assert_eq!(summary, StatisticsSummary::empty(SymptomKind::Clarity));
        assert_eq!(summary.trend, Trend::Stable);
    }

    #[test]
    fn test_slope_uses_calendar_days() {
        let summary = compute_statistics(&series(SymptomKind::Climate, &[1.0, 2.0, 3.0, 4.0]), 3);
        assert_eq!(summary.slope, Some(1.0));
    }

    #[test]
    fn test_compute_all_covers_every_symptom() {
        let set = SeriesSet::default().with_series(series(SymptomKind::Rest, &[5.0; 4]));
        let all = compute_all_statistics(&set, &StatisticsConfig::default());
        assert_eq!(all.len(), 3);
        assert_eq!(all[&SymptomKind::Rest].count, 4);
        assert_eq!(all[&SymptomKind::Climate].count, 0);
    }
}
