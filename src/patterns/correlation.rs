use crate::core::{round_to, SeriesSet, SymptomKind, SymptomSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pearson coefficient between two symptoms over their shared days.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymptomCorrelation {
    pub first: SymptomKind,
    pub second: SymptomKind,
    /// Always within [-1, 1].
    pub coefficient: f64,
    /// Number of days both symptoms were recorded.
    pub overlap: usize,
}

impl SymptomCorrelation {
    /// Label such as `rest-climate`.
    pub fn pair_label(&self) -> String {
        format!("{}-{}", self.first, self.second)
    }

    pub fn strength(&self) -> CorrelationStrength {
        CorrelationStrength::classify(self.coefficient)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn classify(coefficient: f64) -> Self {
        let magnitude = coefficient.abs();
        if magnitude > 0.7 {
            CorrelationStrength::Strong
        } else if magnitude > 0.4 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Weak => "weak",
        }
    }
}

/// Correlate every symptom pair; pairs without enough shared days, or with a
/// constant side, are left out.
pub fn calculate_correlations(series: &SeriesSet, min_overlap: usize) -> Vec<SymptomCorrelation> {
    const PAIRS: [(SymptomKind, SymptomKind); 3] = [
        (SymptomKind::Rest, SymptomKind::Climate),
        (SymptomKind::Rest, SymptomKind::Clarity),
        (SymptomKind::Climate, SymptomKind::Clarity),
    ];

    PAIRS
        .iter()
        .filter_map(|&(a, b)| correlate_pair(series.get(a), series.get(b), min_overlap))
        .collect()
}

/// Correlate two series on same-date points.
pub fn correlate_pair(
    first: &SymptomSeries,
    second: &SymptomSeries,
    min_overlap: usize,
) -> Option<SymptomCorrelation> {
    let (xs, ys) = align_by_date(first, second);
    if xs.len() < min_overlap.max(2) {
        return None;
    }

    let coefficient = calculate_pearson_correlation(&xs, &ys)?;
    Some(SymptomCorrelation {
        first: first.kind,
        second: second.kind,
        coefficient: round_to(coefficient.clamp(-1.0, 1.0), 3),
        overlap: xs.len(),
    })
}

fn align_by_date(first: &SymptomSeries, second: &SymptomSeries) -> (Vec<f64>, Vec<f64>) {
    let lookup: BTreeMap<_, _> = second.points().iter().map(|p| (p.date, p.value)).collect();

    first
        .points()
        .iter()
        .filter_map(|p| lookup.get(&p.date).map(|&other| (p.value, other)))
        .unzip()
}

pub fn calculate_pearson_correlation(x_values: &[f64], y_values: &[f64]) -> Option<f64> {
    let n = x_values.len() as f64;
    if x_values.is_empty() || x_values.len() != y_values.len() {
        return None;
    }

    let mean_x = x_values.iter().sum::<f64>() / n;
    let mean_y = y_values.iter().sum::<f64>() / n;

    let (covariance, variance_x, variance_y) = x_values
        .iter()
        .zip(y_values.iter())
        .map(|(x, y)| {
            let diff_x = x - mean_x;
            let diff_y = y - mean_y;
            (diff_x * diff_y, diff_x * diff_x, diff_y * diff_y)
        })
        .fold((0.0, 0.0, 0.0), |acc, (cov, var_x, var_y)| {
            (acc.0 + cov, acc.1 + var_x, acc.2 + var_y)
        });

    let std_dev_x = (variance_x / n).sqrt();
    let std_dev_y = (variance_y / n).sqrt();

    if std_dev_x == 0.0 || std_dev_y == 0.0 {
        return None;
    }

    Some(covariance / (n * std_dev_x * std_dev_y))
}
