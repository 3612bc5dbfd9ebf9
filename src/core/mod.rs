pub mod series;

pub use series::{SeriesPoint, SeriesSet, SymptomSeries};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of the canonical severity scale.
pub const SCALE_MAX: f64 = 10.0;
/// Lower bound of the canonical severity scale.
pub const SCALE_MIN: f64 = 0.0;

/// One day's symptom log.
///
/// Entries are owned by the storage layer; the engine only ever borrows them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PulseEntry {
    pub timestamp: NaiveDate,
    #[serde(default)]
    pub rest: Option<RawObservation>,
    #[serde(default)]
    pub climate: Option<RawObservation>,
    #[serde(default)]
    pub clarity: Option<RawObservation>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PulseEntry {
    pub fn new(timestamp: NaiveDate) -> Self {
        Self {
            timestamp,
            rest: None,
            climate: None,
            clarity: None,
            notes: None,
        }
    }

    pub fn with_rest(mut self, value: impl Into<RawObservation>) -> Self {
        self.rest = Some(value.into());
        self
    }

    pub fn with_climate(mut self, value: impl Into<RawObservation>) -> Self {
        self.climate = Some(value.into());
        self
    }

    pub fn with_clarity(mut self, value: impl Into<RawObservation>) -> Self {
        self.clarity = Some(value.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Raw observation recorded for the given symptom, if any.
    pub fn observation(&self, kind: SymptomKind) -> Option<&RawObservation> {
        match kind {
            SymptomKind::Rest => self.rest.as_ref(),
            SymptomKind::Climate => self.climate.as_ref(),
            SymptomKind::Clarity => self.clarity.as_ref(),
        }
    }
}

/// A symptom value exactly as it was logged.
///
/// Historical data mixes qualitative labels, numbers and numbers stored as
/// text; anything else lands in `Other` so a single malformed record never
/// fails deserialization of the whole history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawObservation {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for RawObservation {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for RawObservation {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for RawObservation {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawObservation {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Whether larger values of a symptom are good or bad news.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Quality scale: 10 is the best possible day.
    HigherIsBetter,
    /// Severity scale: 0 means no symptoms, 10 maximum disruption.
    HigherIsWorse,
}

impl Polarity {
    /// Classify a signed change as worsening (`true`) or improving (`false`).
    pub fn is_deterioration(self, delta: f64) -> bool {
        match self {
            Polarity::HigherIsBetter => delta < 0.0,
            Polarity::HigherIsWorse => delta > 0.0,
        }
    }

    /// Signed change expressed so that positive always means "worse".
    pub fn worsening_delta(self, delta: f64) -> f64 {
        match self {
            Polarity::HigherIsBetter => -delta,
            Polarity::HigherIsWorse => delta,
        }
    }
}

/// The three tracked symptom dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomKind {
    /// Sleep quality.
    Rest,
    /// Hot-flash / vasomotor intensity.
    Climate,
    /// Cognitive fog.
    Clarity,
}

impl SymptomKind {
    pub const ALL: [SymptomKind; 3] = [SymptomKind::Rest, SymptomKind::Climate, SymptomKind::Clarity];

    pub fn polarity(self) -> Polarity {
        match self {
            SymptomKind::Rest => Polarity::HigherIsBetter,
            SymptomKind::Climate | SymptomKind::Clarity => Polarity::HigherIsWorse,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymptomKind::Rest => "rest",
            SymptomKind::Climate => "climate",
            SymptomKind::Clarity => "clarity",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SymptomKind::Rest => "sleep quality",
            SymptomKind::Climate => "hot-flash intensity",
            SymptomKind::Clarity => "cognitive fog",
        }
    }

    /// Whether a canonical value counts as a severe reading for this symptom.
    ///
    /// `severe_threshold` is expressed on the severity scale; quality scales
    /// are mirrored so that rest quality <= 10 - threshold is severe.
    pub fn is_severe(self, value: f64, severe_threshold: f64) -> bool {
        match self.polarity() {
            Polarity::HigherIsWorse => value >= severe_threshold,
            Polarity::HigherIsBetter => value <= SCALE_MAX - severe_threshold,
        }
    }
}

impl fmt::Display for SymptomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directional classification of a symptom's recent change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

impl Trend {
    /// Map a signed change onto a trend, honouring the symptom's polarity.
    pub fn from_change(polarity: Polarity, delta: f64, significant: bool) -> Self {
        if !significant || delta == 0.0 {
            Trend::Stable
        } else if polarity.is_deterioration(delta) {
            Trend::Worsening
        } else {
            Trend::Improving
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Worsening => "worsening",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round to a fixed number of decimal places for stable, readable output.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
