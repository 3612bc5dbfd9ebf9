use super::{PulseEntry, SymptomKind};
use crate::mapping::{map_symptom_value_for, MappedValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single mapped observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Chronologically ordered canonical values for one symptom.
///
/// Points whose raw value mapped to the "no value" sentinel are never stored;
/// they are only counted in `skipped`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymptomSeries {
    pub kind: SymptomKind,
    points: Vec<SeriesPoint>,
    pub skipped: usize,
}

impl SymptomSeries {
    pub fn empty(kind: SymptomKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
            skipped: 0,
        }
    }

    /// Build a series from already-canonical points. Points are sorted by date.
    pub fn from_points(kind: SymptomKind, points: impl IntoIterator<Item = SeriesPoint>) -> Self {
        let mut points: Vec<SeriesPoint> = points
            .into_iter()
            .filter(|p| p.value.is_finite())
            .collect();
        points.sort_by_key(|p| p.date);
        Self {
            kind,
            points,
            skipped: 0,
        }
    }

    /// Convenience constructor for consecutive daily values starting at `start`.
    pub fn daily(kind: SymptomKind, start: NaiveDate, values: &[f64]) -> Self {
        Self::from_points(
            kind,
            values.iter().enumerate().filter_map(|(offset, &value)| {
                start
                    .checked_add_days(chrono::Days::new(offset as u64))
                    .map(|date| SeriesPoint { date, value })
            }),
        )
    }

    /// Map one symptom field of every entry onto the canonical scale.
    pub fn from_entries(entries: &[PulseEntry], kind: SymptomKind) -> Self {
        let mut skipped = 0;
        let points = entries
            .iter()
            .filter_map(|entry| match map_symptom_value_for(kind, entry.observation(kind)) {
                MappedValue::Known(value) => Some(SeriesPoint {
                    date: entry.timestamp,
                    value,
                }),
                MappedValue::Unknown(reason) => {
                    // Absent fields are normal; only malformed values are worth a trace.
                    if entry.observation(kind).is_some() {
                        log::debug!(
                            "Skipping {} on {}: {:?}",
                            kind,
                            entry.timestamp,
                            reason
                        );
                    }
                    skipped += 1;
                    None
                }
            })
            .collect::<Vec<_>>();

        let mut series = Self::from_points(kind, points);
        series.skipped = skipped;
        series
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when every stored value is identical (including a single point).
    pub fn is_constant(&self) -> bool {
        match self.points.first() {
            Some(first) => self.points.iter().all(|p| p.value == first.value),
            None => true,
        }
    }

    /// Days elapsed since the first point, for regression against time.
    pub fn day_offsets(&self) -> Vec<f64> {
        match self.points.first() {
            Some(first) => self
                .points
                .iter()
                .map(|p| (p.date - first.date).num_days() as f64)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// One series per tracked symptom, covering the same analysis window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesSet {
    pub rest: SymptomSeries,
    pub climate: SymptomSeries,
    pub clarity: SymptomSeries,
}

impl Default for SeriesSet {
    fn default() -> Self {
        Self {
            rest: SymptomSeries::empty(SymptomKind::Rest),
            climate: SymptomSeries::empty(SymptomKind::Climate),
            clarity: SymptomSeries::empty(SymptomKind::Clarity),
        }
    }
}

impl SeriesSet {
    pub fn from_entries(entries: &[PulseEntry]) -> Self {
        Self {
            rest: SymptomSeries::from_entries(entries, SymptomKind::Rest),
            climate: SymptomSeries::from_entries(entries, SymptomKind::Climate),
            clarity: SymptomSeries::from_entries(entries, SymptomKind::Clarity),
        }
    }

    /// Replace the series for `series.kind`.
    pub fn with_series(mut self, series: SymptomSeries) -> Self {
        match series.kind {
            SymptomKind::Rest => self.rest = series,
            SymptomKind::Climate => self.climate = series,
            SymptomKind::Clarity => self.clarity = series,
        }
        self
    }

    pub fn get(&self, kind: SymptomKind) -> &SymptomSeries {
        match kind {
            SymptomKind::Rest => &self.rest,
            SymptomKind::Climate => &self.climate,
            SymptomKind::Clarity => &self.clarity,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymptomSeries> {
        [&self.rest, &self.climate, &self.clarity].into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(SymptomSeries::is_empty)
    }
}
