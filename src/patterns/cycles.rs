use crate::core::{round_to, SymptomKind, SymptomSeries};
use crate::stats::descriptive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Candidate periods tested for recurring structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePeriod {
    Weekly,
    Monthly,
}

impl CyclePeriod {
    pub const ALL: [CyclePeriod; 2] = [CyclePeriod::Weekly, CyclePeriod::Monthly];

    pub fn days(self) -> usize {
        match self {
            CyclePeriod::Weekly => 7,
            CyclePeriod::Monthly => 28,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CyclePeriod::Weekly => "weekly",
            CyclePeriod::Monthly => "monthly",
        }
    }
}

impl fmt::Display for CyclePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedCycle {
    pub symptom: SymptomKind,
    pub period: CyclePeriod,
    /// Magnitude of the normalized autocorrelation at the period lag, in [0, 1].
    pub confidence: f64,
}

/// Autocorrelation-based confidence that `series` repeats every `period` days.
///
/// Lags are measured in calendar days, so gaps in the log reduce the number
/// of contributing pairs instead of shifting the alignment. Returns `0.0`
/// for series shorter than two full periods and for constant series.
pub fn cycle_confidence(series: &SymptomSeries, period: CyclePeriod) -> f64 {
    let lag = period.days();
    if series.len() < lag * 2 || series.is_constant() {
        return 0.0;
    }

    let values = series.values();
    let mean = descriptive::mean(&values);
    let baseline: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    if baseline == 0.0 {
        return 0.0;
    }

    let by_date: BTreeMap<_, _> = series
        .points()
        .iter()
        .map(|p| (p.date, p.value - mean))
        .collect();

    let lagged: f64 = series
        .points()
        .iter()
        .filter_map(|p| {
            let later = p.date.checked_add_days(chrono::Days::new(lag as u64))?;
            by_date.get(&later).map(|deviation| (p.value - mean) * deviation)
        })
        .sum();

    round_to((lagged / baseline).abs().clamp(0.0, 1.0), 3)
}

/// Every (symptom, period) combination whose confidence clears `min_confidence`.
pub fn detect_cycles<'a>(
    series: impl IntoIterator<Item = &'a SymptomSeries>,
    min_confidence: f64,
) -> Vec<DetectedCycle> {
    series
        .into_iter()
        .flat_map(|s| {
            CyclePeriod::ALL.into_iter().filter_map(move |period| {
                let confidence = cycle_confidence(s, period);
                (confidence > min_confidence).then_some(DetectedCycle {
                    symptom: s.kind,
                    period,
                    confidence,
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn weekly_pattern(weeks: usize) -> Vec<f64> {
        [8.0, 8.0, 2.0, 2.0, 2.0, 2.0, 2.0]
            .iter()
            .copied()
            .cycle()
            .take(weeks * 7)
            .collect()
    }

    #[test]
    fn test_strong_weekly_cycle_detected() {
        let series = SymptomSeries::daily(SymptomKind::Climate, start(), &weekly_pattern(4));
        let confidence = cycle_confidence(&series, CyclePeriod::Weekly);
        assert_eq!(confidence, 0.75);

        let cycles = detect_cycles([&series], 0.3);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].period, CyclePeriod::Weekly);
        assert_eq!(cycles[0].symptom, SymptomKind::Climate);
    }

    #[test]
    fn test_constant_series_has_no_cycle() {
        let series = SymptomSeries::daily(SymptomKind::Rest, start(), &[6.0; 21]);
        assert_eq!(cycle_confidence(&series, CyclePeriod::Weekly), 0.0);
        assert!(detect_cycles([&series], 0.3).is_empty());
    }

    #[test]
    fn test_short_series_is_not_tested() {
        let series = SymptomSeries::daily(SymptomKind::Rest, start(), &weekly_pattern(4)[..13]);
        assert_eq!(cycle_confidence(&series, CyclePeriod::Weekly), 0.0);

        // 28 days is enough for weekly but not for monthly
        let series = SymptomSeries::daily(SymptomKind::Rest, start(), &weekly_pattern(4));
        assert_eq!(cycle_confidence(&series, CyclePeriod::Monthly), 0.0);
    }

    #[test]
    fn test_confidence_bounded() {
        let alternating: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 0.0 } else { 10.0 }).collect();
        let series = SymptomSeries::daily(SymptomKind::Clarity, start(), &alternating);
        let confidence = cycle_confidence(&series, CyclePeriod::Weekly);
        assert!((0.0..=1.0).contains(&confidence));
    }
}
