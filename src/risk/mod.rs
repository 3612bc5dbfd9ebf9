//! Rule-based risk assessment over recent entries.
//!
//! The assessor is a pure function of its inputs: the same entries and notes
//! always produce the same level, score, flags and rationale.

pub mod rules;

pub use rules::{default_rules, DayReading, RiskRule, RiskSnapshot};

use crate::config::{RiskConfig, RiskWeights};
use crate::core::PulseEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Monotonic score-to-level table.
    pub fn from_score(score: u32, config: &RiskConfig) -> Self {
        if score >= config.high_score {
            RiskLevel::High
        } else if score >= config.moderate_score {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named rule outcomes. Declaration order fixes rationale order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    PersistentPoorSleep,
    SevereHotFlashes,
    ConcerningUserNotes,
    MultipleSevereSymptoms,
    RapidDeterioration,
    SevereBrainFog,
}

impl RiskFlag {
    pub const ALL: [RiskFlag; 6] = [
        RiskFlag::PersistentPoorSleep,
        RiskFlag::SevereHotFlashes,
        RiskFlag::ConcerningUserNotes,
        RiskFlag::MultipleSevereSymptoms,
        RiskFlag::RapidDeterioration,
        RiskFlag::SevereBrainFog,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskFlag::PersistentPoorSleep => "persistent_poor_sleep",
            RiskFlag::SevereHotFlashes => "severe_hot_flashes",
            RiskFlag::ConcerningUserNotes => "concerning_user_notes",
            RiskFlag::MultipleSevereSymptoms => "multiple_severe_symptoms",
            RiskFlag::RapidDeterioration => "rapid_deterioration",
            RiskFlag::SevereBrainFog => "severe_brain_fog",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RiskFlag::PersistentPoorSleep => "Persistently poor sleep quality",
            RiskFlag::SevereHotFlashes => "Frequent severe hot flashes",
            RiskFlag::ConcerningUserNotes => "Concerning language in notes",
            RiskFlag::MultipleSevereSymptoms => "Multiple severe symptoms at the same time",
            RiskFlag::RapidDeterioration => "Rapid deterioration compared with the previous week",
            RiskFlag::SevereBrainFog => "Brain fog severity above 7/10 average",
        }
    }

    pub fn weight(self, weights: &RiskWeights) -> u32 {
        match self {
            RiskFlag::PersistentPoorSleep => weights.persistent_poor_sleep,
            RiskFlag::SevereHotFlashes => weights.severe_hot_flashes,
            RiskFlag::ConcerningUserNotes => weights.concerning_user_notes,
            RiskFlag::MultipleSevereSymptoms => weights.multiple_severe_symptoms,
            RiskFlag::RapidDeterioration => weights.rapid_deterioration,
            RiskFlag::SevereBrainFog => weights.severe_brain_fog,
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: u32,
    pub flags: BTreeSet<RiskFlag>,
    pub rationale: String,
    pub insufficient_data: bool,
}

impl RiskAssessment {
    fn insufficient(entries: usize, required: usize) -> Self {
        let level = RiskLevel::Low;
        Self {
            level,
            score: 0,
            flags: BTreeSet::new(),
            rationale: format!(
                "Risk level: {} (score: 0). Insufficient data: {} of {} required entries.",
                level, entries, required
            ),
            insufficient_data: true,
        }
    }

    fn from_flags(flags: BTreeSet<RiskFlag>, config: &RiskConfig) -> Self {
        let score = flags.iter().map(|f| f.weight(&config.weights)).sum();
        let level = RiskLevel::from_score(score, config);
        let rationale = build_rationale(level, score, &flags);
        Self {
            level,
            score,
            flags,
            rationale,
            insufficient_data: false,
        }
    }

    pub fn has_flag(&self, flag: RiskFlag) -> bool {
        self.flags.contains(&flag)
    }
}

fn build_rationale(level: RiskLevel, score: u32, flags: &BTreeSet<RiskFlag>) -> String {
    let head = format!("Risk level: {} (score: {}).", level, score);
    if flags.is_empty() {
        return format!("{} No risk rules triggered.", head);
    }

    let details: Vec<&str> = flags.iter().map(|f| f.description()).collect();
    format!("{} {}", head, details.join("; "))
}

/// Evaluates a rule set against entry histories.
pub struct RiskAssessor {
    config: RiskConfig,
    rules: Vec<Box<dyn RiskRule>>,
}

impl RiskAssessor {
    pub fn new(config: RiskConfig) -> Self {
        let rules = default_rules(&config);
        Self { config, rules }
    }

    /// Assessor with a caller-chosen rule set.
    pub fn with_rules(config: RiskConfig, rules: Vec<Box<dyn RiskRule>>) -> Self {
        Self { config, rules }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn assess(&self, entries: &[PulseEntry], notes: Option<&str>) -> RiskAssessment {
        if entries.len() < self.config.min_entries {
            log::debug!(
                "Risk assessment skipped: {} entries, {} required",
                entries.len(),
                self.config.min_entries
            );
            return RiskAssessment::insufficient(entries.len(), self.config.min_entries);
        }

        let snapshot = RiskSnapshot::new(entries, notes, &self.config);
        let flags: BTreeSet<RiskFlag> = self
            .rules
            .iter()
            .filter(|rule| rule.evaluate(&snapshot))
            .map(|rule| rule.flag())
            .collect();

        let assessment = RiskAssessment::from_flags(flags, &self.config);
        log::debug!(
            "Risk assessed as {} (score {}) over {} entries",
            assessment.level,
            assessment.score,
            entries.len()
        );
        assessment
    }
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::new(RiskConfig::default())
    }
}

pub fn assess_risk(recent: &[PulseEntry], notes: Option<&str>) -> RiskAssessment {
    assess_risk_with(recent, notes, &RiskConfig::default())
}

pub fn assess_risk_with(
    recent: &[PulseEntry],
    notes: Option<&str>,
    config: &RiskConfig,
) -> RiskAssessment {
    RiskAssessor::new(config.clone()).assess(recent, notes)
}
