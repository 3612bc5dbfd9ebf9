use crate::core::SymptomSeries;
use crate::stats::descriptive::percentile;
use chrono::NaiveDate;

/// Dates whose value falls outside the Tukey fences
/// `[Q1 - k * IQR, Q3 + k * IQR]` of the series.
///
/// Series shorter than `min_points` are not examined. A constant series has
/// an IQR of zero and every value sits on both fences, so it never yields
/// outliers.
pub fn detect_outliers(series: &SymptomSeries, min_points: usize, iqr_multiplier: f64) -> Vec<NaiveDate> {
    if series.len() < min_points || series.is_constant() {
        return Vec::new();
    }

    let values = series.values();
    let q1 = percentile(&values, 25.0);
    let q3 = percentile(&values, 75.0);
    let iqr = q3 - q1;
    let lower = q1 - iqr_multiplier * iqr;
    let upper = q3 + iqr_multiplier * iqr;

    series
        .points()
        .iter()
        .filter(|p| p.value < lower || p.value > upper)
        .map(|p| p.date)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SymptomKind;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_spike_is_flagged() {
        let mut values = vec![3.0, 4.0, 3.0, 4.0, 3.0, 4.0, 3.0, 4.0];
        values[5] = 10.0;
        let series = SymptomSeries::daily(SymptomKind::Climate, start(), &values);

        let outliers = detect_outliers(&series, 7, 1.5);
        assert_eq!(outliers, vec![NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()]);
    }

    #[test]
    fn test_constant_series_has_no_outliers() {
        let series = SymptomSeries::daily(SymptomKind::Climate, start(), &[5.0; 21]);
        assert!(detect_outliers(&series, 7, 1.5).is_empty());
    }

    #[test]
    fn test_short_series_is_skipped() {
        let series = SymptomSeries::daily(SymptomKind::Climate, start(), &[1.0, 1.0, 1.0, 10.0]);
        assert!(detect_outliers(&series, 7, 1.5).is_empty());
    }
}
