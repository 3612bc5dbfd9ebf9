//! Normalization of heterogeneous symptom observations.
//!
//! Logged values arrive as qualitative labels ("Flashing"), plain numbers,
//! numbers stored as text ("7"), or occasionally something unusable. This
//! module turns every one of them into either a value on the canonical
//! 0-10 scale or an explicit [`MappedValue::Unknown`] sentinel.
//!
//! # Out-of-range policy
//!
//! Finite numbers outside `[0, 10]` are clamped to the nearest bound. NaN and
//! infinities are treated as unknown. Clamping keeps the mapping idempotent:
//! feeding a `Known` output back in as a number returns the same value.
//!
//! # Generic labels on quality scales
//!
//! `none`, `mild`, `moderate` and `severe` describe how bad a symptom was.
//! On a quality scale such as rest, where 10 is the best night, they are
//! reflected to `10 - severity`: a `"severe"` night maps to 1, not 9.
//! [`map_symptom_value_for`] applies this. [`map_symptom_value`] has no
//! symptom to consult and always reports the severity reading.

pub mod labels;

pub use labels::SeverityLabel;

use crate::core::{Polarity, RawObservation, SymptomKind, SCALE_MAX, SCALE_MIN};
use serde::{Deserialize, Serialize};

/// Why an observation could not be mapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownReason {
    Absent,
    UnrecognizedLabel,
    UnsupportedType,
    NotFinite,
}

/// Result of mapping a raw observation.
///
/// `Unknown` is deliberately distinct from `Known(0.0)`: a day with no
/// symptoms and a day with no data must never be confused.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappedValue {
    Known(f64),
    Unknown(UnknownReason),
}

impl MappedValue {
    pub fn known(self) -> Option<f64> {
        match self {
            MappedValue::Known(value) => Some(value),
            MappedValue::Unknown(_) => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, MappedValue::Known(_))
    }
}

/// Map one raw observation onto the canonical severity scale.
pub fn map_symptom_value(raw: Option<&RawObservation>) -> MappedValue {
    match raw {
        None => MappedValue::Unknown(UnknownReason::Absent),
        Some(RawObservation::Number(value)) => map_numeric(*value),
        Some(RawObservation::Text(text)) => map_text(text),
        Some(RawObservation::Other(serde_json::Value::Null)) => {
            MappedValue::Unknown(UnknownReason::Absent)
        }
        Some(RawObservation::Other(other)) => {
            log::debug!("Unsupported symptom value type: {}", other);
            MappedValue::Unknown(UnknownReason::UnsupportedType)
        }
    }
}

/// Map one raw observation for a specific symptom.
///
/// Identical to [`map_symptom_value`] except that generic severity labels
/// are reflected on quality-scale symptoms.
pub fn map_symptom_value_for(kind: SymptomKind, raw: Option<&RawObservation>) -> MappedValue {
    match raw {
        Some(RawObservation::Text(text)) => match SeverityLabel::parse(text) {
            Some(label) if label.is_generic() && kind.polarity() == Polarity::HigherIsBetter => {
                MappedValue::Known(SCALE_MAX - label.severity())
            }
            _ => map_text(text),
        },
        _ => map_symptom_value(raw),
    }
}

fn map_text(text: &str) -> MappedValue {
    if let Some(label) = SeverityLabel::parse(text) {
        return MappedValue::Known(label.severity());
    }

    match text.trim().parse::<f64>() {
        Ok(value) => map_numeric(value),
        Err(_) => {
            log::debug!("Unrecognized symptom label: {:?}", text);
            MappedValue::Unknown(UnknownReason::UnrecognizedLabel)
        }
    }
}

fn map_numeric(value: f64) -> MappedValue {
    if !value.is_finite() {
        return MappedValue::Unknown(UnknownReason::NotFinite);
    }

    let clamped = value.clamp(SCALE_MIN, SCALE_MAX);
    if clamped != value {
        log::debug!("Clamped out-of-range symptom value {} to {}", value, clamped);
    }
    MappedValue::Known(clamped)
}
