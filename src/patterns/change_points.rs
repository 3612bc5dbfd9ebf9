use crate::core::SymptomSeries;
use crate::stats::descriptive::mean;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    pub date: NaiveDate,
    /// Mean of the following window minus mean of the preceding one.
    pub shift: f64,
}

/// Find dates where the short-window mean jumps by more than `threshold`.
///
/// Each candidate index `i` compares `values[i - window..i]` with
/// `values[i..i + window]`. A single step in the data exceeds the threshold
/// at several neighbouring indices, so each contiguous run of candidates is
/// collapsed to the index with the largest shift.
pub fn detect_change_points(series: &SymptomSeries, window: usize, threshold: f64) -> Vec<ChangePoint> {
    if window == 0 || series.len() < window * 2 || series.is_constant() {
        return Vec::new();
    }

    let values = series.values();
    let points = series.points();
    let mut found = Vec::new();
    let mut best_in_run: Option<(usize, f64)> = None;

    for i in window..=(values.len() - window) {
        let shift = mean(&values[i..i + window]) - mean(&values[i - window..i]);

        if shift.abs() > threshold {
            best_in_run = match best_in_run {
                Some((_, best)) if best.abs() >= shift.abs() => best_in_run,
                _ => Some((i, shift)),
            };
        } else if let Some((index, shift)) = best_in_run.take() {
            found.push(ChangePoint {
                date: points[index].date,
                shift,
            });
        }
    }

    if let Some((index, shift)) = best_in_run {
        found.push(ChangePoint {
            date: points[index].date,
            shift,
        });
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SymptomKind;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    fn step(before: usize, after: usize, low: f64, high: f64) -> SymptomSeries {
        let values: Vec<f64> = std::iter::repeat(low)
            .take(before)
            .chain(std::iter::repeat(high).take(after))
            .collect();
        SymptomSeries::daily(SymptomKind::Climate, start(), &values)
    }

    #[test]
    fn test_single_step_reported_once_at_boundary() {
        let points = detect_change_points(&step(10, 10, 2.0, 8.0), 7, 2.0);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 4, 11).unwrap());
        assert_eq!(points[0].shift, 6.0);
    }

    #[test]
    fn test_small_shift_ignored() {
        assert!(detect_change_points(&step(10, 10, 4.0, 5.0), 7, 2.0).is_empty());
    }

    #[test]
    fn test_requires_two_full_windows() {
        assert!(detect_change_points(&step(6, 7, 1.0, 9.0), 7, 2.0).is_empty());
        assert_eq!(detect_change_points(&step(7, 7, 1.0, 9.0), 7, 2.0).len(), 1);
    }

    #[test]
    fn test_constant_series_has_no_change_points() {
        assert!(detect_change_points(&step(21, 0, 5.0, 5.0), 7, 2.0).is_empty());
    }

    #[test]
    fn test_drop_then_recovery_gives_two_points() {
        let values: Vec<f64> = [8.0; 10]
            .iter()
            .chain([2.0; 10].iter())
            .chain([8.0; 10].iter())
            .copied()
            .collect();
        let series = SymptomSeries::daily(SymptomKind::Rest, start(), &values);

        let points = detect_change_points(&series, 7, 2.0);
        assert_eq!(points.len(), 2);
        assert!(points[0].shift < 0.0);
        assert!(points[1].shift > 0.0);
    }
}
