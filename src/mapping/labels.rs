use serde::{Deserialize, Serialize};

/// Closed table of qualitative labels the pulse log can contain.
///
/// Rest labels describe sleep *quality*, so they sit high on the scale when
/// sleep was good. Every other label is a severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityLabel {
    // Generic severity words
    None,
    Mild,
    Moderate,
    Severe,
    // Rest
    Restorative,
    Fragmented,
    EarlyAwakening,
    // Climate
    Cool,
    Warm,
    Flashing,
    Heavy,
    // Clarity
    Focused,
    Neutral,
    BrainFog,
}

impl SeverityLabel {
    pub const ALL: [SeverityLabel; 14] = [
        SeverityLabel::None,
        SeverityLabel::Mild,
        SeverityLabel::Moderate,
        SeverityLabel::Severe,
        SeverityLabel::Restorative,
        SeverityLabel::Fragmented,
        SeverityLabel::EarlyAwakening,
        SeverityLabel::Cool,
        SeverityLabel::Warm,
        SeverityLabel::Flashing,
        SeverityLabel::Heavy,
        SeverityLabel::Focused,
        SeverityLabel::Neutral,
        SeverityLabel::BrainFog,
    ];

    /// Parse a logged label, ignoring case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Self> {
        let needle = text.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.canonical_name().eq_ignore_ascii_case(needle))
    }

    /// The label as the application writes it.
    pub fn canonical_name(self) -> &'static str {
        match self {
            SeverityLabel::None => "none",
            SeverityLabel::Mild => "mild",
            SeverityLabel::Moderate => "moderate",
            SeverityLabel::Severe => "severe",
            SeverityLabel::Restorative => "Restorative",
            SeverityLabel::Fragmented => "Fragmented",
            SeverityLabel::EarlyAwakening => "3 AM Awakening",
            SeverityLabel::Cool => "Cool",
            SeverityLabel::Warm => "Warm",
            SeverityLabel::Flashing => "Flashing",
            SeverityLabel::Heavy => "Heavy",
            SeverityLabel::Focused => "Focused",
            SeverityLabel::Neutral => "Neutral",
            SeverityLabel::BrainFog => "Brain Fog",
        }
    }

    /// Whether the label is one of the symptom-agnostic severity words.
    pub fn is_generic(self) -> bool {
        matches!(
            self,
            SeverityLabel::None | SeverityLabel::Mild | SeverityLabel::Moderate | SeverityLabel::Severe
        )
    }

    /// Canonical value on the 0-10 scale.
    pub fn severity(self) -> f64 {
        match self {
            SeverityLabel::None => 0.0,
            SeverityLabel::Mild => 3.0,
            SeverityLabel::Moderate => 6.0,
            SeverityLabel::Severe => 9.0,
            SeverityLabel::Restorative => 10.0,
            SeverityLabel::Fragmented => 5.0,
            SeverityLabel::EarlyAwakening => 1.0,
            SeverityLabel::Cool => 0.0,
            SeverityLabel::Warm => 4.0,
            SeverityLabel::Flashing => 7.0,
            SeverityLabel::Heavy => 10.0,
            SeverityLabel::Focused => 0.0,
            SeverityLabel::Neutral => 4.0,
            SeverityLabel::BrainFog => 9.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_label_round_trips_through_parse() {
        for label in SeverityLabel::ALL {
            assert_eq!(SeverityLabel::parse(label.canonical_name()), Some(label));
        }
    }

    #[test]
    fn test_all_severities_on_scale() {
        for label in SeverityLabel::ALL {
            let value = label.severity();
            assert!((0.0..=10.0).contains(&value), "{:?} -> {}", label, value);
        }
    }

    #[test]
    fn test_generic_labels() {
        assert!(SeverityLabel::Severe.is_generic());
        assert!(SeverityLabel::None.is_generic());
        assert!(!SeverityLabel::Fragmented.is_generic());
        assert!(!SeverityLabel::BrainFog.is_generic());
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(SeverityLabel::parse("Tepid"), None);
        assert_eq!(SeverityLabel::parse(""), None);
    }
}
