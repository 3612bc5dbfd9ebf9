//! Independent risk predicates.
//!
//! Each rule inspects a shared, read-only [`RiskSnapshot`] and answers a
//! single yes/no question. Rules never see each other's results; the
//! assessor folds the triggered ones into a score and a flag set.
//!
//! # Available Rules
//!
//! - [`PersistentPoorSleep`]: mean rest quality over the recent window is low
//! - [`SevereHotFlashes`]: several recent entries with severe climate readings
//! - [`ConcerningUserNotes`]: distress keywords in entry or session notes
//! - [`MultipleSevereSymptoms`]: severe readings across dimensions in a short sub-window
//! - [`RapidDeterioration`]: the recent window is much worse than the one before
//! - [`SevereBrainFog`]: mean clarity severity over the recent window is high

use super::RiskFlag;
use crate::config::RiskConfig;
use crate::core::{PulseEntry, SymptomKind};
use crate::mapping::map_symptom_value_for;
use crate::stats::descriptive::mean;
use chrono::NaiveDate;

/// Canonical values for one logged day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReading<'a> {
    pub date: NaiveDate,
    pub rest: Option<f64>,
    pub climate: Option<f64>,
    pub clarity: Option<f64>,
    pub notes: Option<&'a str>,
}

impl<'a> DayReading<'a> {
    pub fn from_entry(entry: &'a PulseEntry) -> Self {
        let value = |kind| map_symptom_value_for(kind, entry.observation(kind)).known();
        Self {
            date: entry.timestamp,
            rest: value(SymptomKind::Rest),
            climate: value(SymptomKind::Climate),
            clarity: value(SymptomKind::Clarity),
            notes: entry.notes.as_deref(),
        }
    }

    pub fn value(&self, kind: SymptomKind) -> Option<f64> {
        match kind {
            SymptomKind::Rest => self.rest,
            SymptomKind::Climate => self.climate,
            SymptomKind::Clarity => self.clarity,
        }
    }
}

/// Mapped, chronologically sorted view of the entries under assessment.
#[derive(Debug, Clone)]
pub struct RiskSnapshot<'a> {
    readings: Vec<DayReading<'a>>,
    notes: Option<&'a str>,
    config: &'a RiskConfig,
}

impl<'a> RiskSnapshot<'a> {
    pub fn new(entries: &'a [PulseEntry], notes: Option<&'a str>, config: &'a RiskConfig) -> Self {
        let mut readings: Vec<DayReading<'a>> = entries.iter().map(DayReading::from_entry).collect();
        readings.sort_by_key(|r| r.date);
        Self {
            readings,
            notes,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn config(&self) -> &RiskConfig {
        self.config
    }

    /// Free-text notes supplied alongside the entries.
    pub fn session_notes(&self) -> Option<&str> {
        self.notes
    }

    /// The last `window_days` readings.
    pub fn recent(&self) -> &[DayReading<'a>] {
        let start = self.readings.len().saturating_sub(self.config.window_days);
        &self.readings[start..]
    }

    /// The `window_days` readings immediately before [`Self::recent`], which
    /// may be shorter than a full window.
    pub fn previous(&self) -> &[DayReading<'a>] {
        let end = self.readings.len().saturating_sub(self.config.window_days);
        let start = end.saturating_sub(self.config.window_days);
        &self.readings[start..end]
    }

    pub fn recent_values(&self, kind: SymptomKind) -> Vec<f64> {
        values_of(self.recent(), kind)
    }
}

fn values_of(readings: &[DayReading<'_>], kind: SymptomKind) -> Vec<f64> {
    readings.iter().filter_map(|r| r.value(kind)).collect()
}

/// A single auditable risk rule.
pub trait RiskRule: Send + Sync {
    /// Flag raised when the rule triggers.
    fn flag(&self) -> RiskFlag;

    fn evaluate(&self, snapshot: &RiskSnapshot<'_>) -> bool;
}

/// The standard rule set, in flag declaration order.
pub fn default_rules(config: &RiskConfig) -> Vec<Box<dyn RiskRule>> {
    vec![
        Box::new(PersistentPoorSleep::from_config(config)),
        Box::new(SevereHotFlashes::from_config(config)),
        Box::new(ConcerningUserNotes::from_config(config)),
        Box::new(MultipleSevereSymptoms::from_config(config)),
        Box::new(RapidDeterioration::from_config(config)),
        Box::new(SevereBrainFog::from_config(config)),
    ]
}

// =============================================================================
// Sleep
// =============================================================================

/// Mean rest quality over the recent window is below a threshold.
#[derive(Debug, Clone, Copy)]
pub struct PersistentPoorSleep {
    max_mean: f64,
}

impl PersistentPoorSleep {
    pub fn new(max_mean: f64) -> Self {
        Self { max_mean }
    }

    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.poor_sleep_mean)
    }
}

impl RiskRule for PersistentPoorSleep {
    fn flag(&self) -> RiskFlag {
        RiskFlag::PersistentPoorSleep
    }

    fn evaluate(&self, snapshot: &RiskSnapshot<'_>) -> bool {
        let values = snapshot.recent_values(SymptomKind::Rest);
        !values.is_empty() && mean(&values) < self.max_mean
    }
}

// =============================================================================
// Hot flashes
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct SevereHotFlashes {
    threshold: f64,
    min_count: usize,
}

impl SevereHotFlashes {
    pub fn new(threshold: f64, min_count: usize) -> Self {
        Self {
            threshold,
            min_count,
        }
    }

    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.severe_threshold, config.severe_climate_min_count)
    }
}

impl RiskRule for SevereHotFlashes {
    fn flag(&self) -> RiskFlag {
        RiskFlag::SevereHotFlashes
    }

    fn evaluate(&self, snapshot: &RiskSnapshot<'_>) -> bool {
        let severe = snapshot
            .recent_values(SymptomKind::Climate)
            .into_iter()
            .filter(|&v| v >= self.threshold)
            .count();
        severe >= self.min_count
    }
}

// =============================================================================
// Notes
// =============================================================================

/// Case-insensitive keyword match over recent entry notes and session notes.
#[derive(Debug, Clone)]
pub struct ConcerningUserNotes {
    keywords: Vec<String>,
}

impl ConcerningUserNotes {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| normalize_text(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(&config.concerning_keywords)
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = normalize_text(text);
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Lowercase and fold typographic apostrophes so "can’t" matches "can't".
fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase().replace('\u{2019}', "'")
}

impl RiskRule for ConcerningUserNotes {
    fn flag(&self) -> RiskFlag {
        RiskFlag::ConcerningUserNotes
    }

    fn evaluate(&self, snapshot: &RiskSnapshot<'_>) -> bool {
        snapshot
            .recent()
            .iter()
            .filter_map(|r| r.notes)
            .chain(snapshot.session_notes())
            .any(|text| self.matches(text))
    }
}

// =============================================================================
// Co-occurring severity
// =============================================================================

/// Severe readings in several dimensions within `cluster_window` consecutive entries.
#[derive(Debug, Clone, Copy)]
pub struct MultipleSevereSymptoms {
    threshold: f64,
    cluster_window: usize,
    min_dimensions: usize,
}

impl MultipleSevereSymptoms {
    pub fn new(threshold: f64, cluster_window: usize, min_dimensions: usize) -> Self {
        Self {
            threshold,
            cluster_window: cluster_window.max(1),
            min_dimensions,
        }
    }

    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(
            config.severe_threshold,
            config.cluster_window,
            config.min_severe_dimensions,
        )
    }

    fn severe_dimensions(&self, cluster: &[DayReading<'_>]) -> usize {
        SymptomKind::ALL
            .iter()
            .filter(|&&kind| {
                cluster
                    .iter()
                    .filter_map(|r| r.value(kind))
                    .any(|v| kind.is_severe(v, self.threshold))
            })
            .count()
    }
}

impl RiskRule for MultipleSevereSymptoms {
    fn flag(&self) -> RiskFlag {
        RiskFlag::MultipleSevereSymptoms
    }

    fn evaluate(&self, snapshot: &RiskSnapshot<'_>) -> bool {
        let recent = snapshot.recent();
        if recent.is_empty() {
            return false;
        }

        let width = self.cluster_window.clamp(1, recent.len());
        recent
            .windows(width)
            .any(|cluster| self.severe_dimensions(cluster) >= self.min_dimensions)
    }
}

// =============================================================================
// Deterioration
// =============================================================================

/// Some symptom's recent mean is worse than the preceding window's by more
/// than `min_points`. Needs two full windows of history.
#[derive(Debug, Clone, Copy)]
pub struct RapidDeterioration {
    min_points: f64,
}

impl RapidDeterioration {
    pub fn new(min_points: f64) -> Self {
        Self { min_points }
    }

    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.deterioration_points)
    }

    /// Polarity-adjusted worsening for one symptom, if both windows have data.
    pub fn worsening(snapshot: &RiskSnapshot<'_>, kind: SymptomKind) -> Option<f64> {
        let recent = values_of(snapshot.recent(), kind);
        let previous = values_of(snapshot.previous(), kind);
        if recent.is_empty() || previous.is_empty() {
            return None;
        }
        Some(kind.polarity().worsening_delta(mean(&recent) - mean(&previous)))
    }
}

impl RiskRule for RapidDeterioration {
    fn flag(&self) -> RiskFlag {
        RiskFlag::RapidDeterioration
    }

    fn evaluate(&self, snapshot: &RiskSnapshot<'_>) -> bool {
        let window = snapshot.config().window_days;
        if window == 0 || snapshot.len() < window * 2 {
            return false;
        }

        SymptomKind::ALL
            .iter()
            .filter_map(|&kind| Self::worsening(snapshot, kind))
            .any(|delta| delta > self.min_points)
    }
}

// =============================================================================
// Cognition
// =============================================================================

/// Mean clarity severity over the recent window is above a threshold.
#[derive(Debug, Clone, Copy)]
pub struct SevereBrainFog {
    min_mean: f64,
}

impl SevereBrainFog {
    pub fn new(min_mean: f64) -> Self {
        Self { min_mean }
    }

    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.severe_brain_fog_mean)
    }
}

impl RiskRule for SevereBrainFog {
    fn flag(&self) -> RiskFlag {
        RiskFlag::SevereBrainFog
    }

    fn evaluate(&self, snapshot: &RiskSnapshot<'_>) -> bool {
        let values = snapshot.recent_values(SymptomKind::Clarity);
        !values.is_empty() && mean(&values) > self.min_mean
    }
}
