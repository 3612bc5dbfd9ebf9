//! End-to-end analysis of a symptom log.
//!
//! Entries are mapped once into a [`SeriesSet`]; statistics and pattern
//! detection then run side by side, and risk is assessed over the most
//! recent entries. Everything here is pure apart from logging, so the
//! report for a given input and configuration is always the same.

use crate::cache::{CacheGroup, CacheRegistry, KeyBuilder};
use crate::config::PulsemapConfig;
use crate::core::{PulseEntry, SeriesSet, SymptomKind};
use crate::errors::Result;
use crate::patterns::{detect_patterns, PatternAnalysis};
use crate::risk::{assess_risk_with, RiskAssessment};
use crate::stats::{compute_all_statistics, StatisticsSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug_span, info, info_span};

/// The slice of history a report was computed over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Entries inside the window.
    pub entries: usize,
    /// Per-symptom count of entries without a usable value.
    pub skipped: BTreeMap<SymptomKind, usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PulseReport {
    pub statistics: BTreeMap<SymptomKind, StatisticsSummary>,
    pub patterns: PatternAnalysis,
    pub risk: RiskAssessment,
    /// Entries supplied by the caller, before windowing.
    pub entry_count: usize,
    pub window: AnalysisWindow,
}

/// Sort entries by date and keep the last `limit`.
pub fn recent_entries(entries: &[PulseEntry], limit: usize) -> Vec<PulseEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| e.timestamp);
    let start = sorted.len().saturating_sub(limit);
    sorted.split_off(start)
}

pub fn analyze_entries(entries: &[PulseEntry], config: &PulsemapConfig) -> PulseReport {
    analyze_entries_with_notes(entries, None, config)
}

pub fn analyze_entries_with_notes(
    entries: &[PulseEntry],
    notes: Option<&str>,
    config: &PulsemapConfig,
) -> PulseReport {
    let span = info_span!(
        "pulse_analysis",
        entry_count = entries.len(),
        history_days = config.analysis.history_days,
    );
    let _guard = span.enter();

    let window = recent_entries(entries, config.analysis.history_days);
    let series = {
        let _span = debug_span!("symptom_mapping").entered();
        SeriesSet::from_entries(&window)
    };

    let (statistics, patterns) = rayon::join(
        || {
            let _span = debug_span!("statistics").entered();
            compute_all_statistics(&series, &config.statistics)
        },
        || {
            let _span = debug_span!("pattern_detection").entered();
            detect_patterns(&series, &config.patterns)
        },
    );

    let risk = {
        let _span = debug_span!("risk_assessment").entered();
        let risk_window = config.risk.window_days.saturating_mul(2);
        let start = window.len().saturating_sub(risk_window);
        assess_risk_with(&window[start..], notes, &config.risk)
    };

    info!(
        entries = window.len(),
        risk = %risk.level,
        "Pulse analysis complete"
    );

    PulseReport {
        statistics,
        patterns,
        risk,
        entry_count: entries.len(),
        window: AnalysisWindow {
            start: window.first().map(|e| e.timestamp),
            end: window.last().map(|e| e.timestamp),
            entries: window.len(),
            skipped: series.iter().map(|s| (s.kind, s.skipped)).collect(),
        },
    }
}

/// [`analyze_entries_with_notes`] behind the registry's analysis cache.
///
/// The key covers the entries, the notes and the configuration, so any edit
/// to the log or the thresholds produces a fresh report.
pub fn analyze_entries_cached(
    registry: &CacheRegistry,
    entries: &[PulseEntry],
    notes: Option<&str>,
    config: &PulsemapConfig,
) -> Result<PulseReport> {
    let key = KeyBuilder::new(CacheGroup::Analysis.as_str())
        .arg(entries)
        .arg(&notes)
        .arg(config)
        .finish();

    registry.cached_json(CacheGroup::Analysis, &key, None, || {
        Ok(analyze_entries_with_notes(entries, notes, config))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Trend;
    use crate::risk::{RiskFlag, RiskLevel};

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1)
            .unwrap()
            .checked_add_days(chrono::Days::new(offset))
            .unwrap()
    }

    #[test]
    fn test_empty_log() {
        let report = analyze_entries(&[], &PulsemapConfig::default());
        assert_eq!(report.entry_count, 0);
        assert_eq!(report.window.start, None);
        assert_eq!(report.patterns, PatternAnalysis::empty());
        assert!(report.risk.insufficient_data);
        assert_eq!(report.statistics.len(), 3);
    }

    #[test]
    fn test_window_keeps_most_recent_history() {
        let entries: Vec<PulseEntry> = (0..40)
            .rev()
            .map(|i| PulseEntry::new(day(i)).with_climate(3))
            .collect();
        let report = analyze_entries(&entries, &PulsemapConfig::default());

        assert_eq!(report.entry_count, 40);
        assert_eq!(report.window.entries, 30);
        assert_eq!(report.window.start, Some(day(10)));
        assert_eq!(report.window.end, Some(day(39)));
    }

    #[test]
    fn test_rest_decline_flows_through_report() {
        let entries: Vec<PulseEntry> = (0..14)
            .map(|i| PulseEntry::new(day(i)).with_rest(if i < 7 { 8 } else { 2 }))
            .collect();
        let report = analyze_entries(&entries, &PulsemapConfig::default());

        assert_eq!(report.statistics[&SymptomKind::Rest].trend, Trend::Worsening);
        assert!(report.risk.has_flag(RiskFlag::PersistentPoorSleep));
        assert!(report.risk.has_flag(RiskFlag::RapidDeterioration));
        assert_eq!(report.risk.level, RiskLevel::Moderate);
    }

    #[test]
    fn test_skipped_values_reported() {
        let entries = vec![
            PulseEntry::new(day(0)).with_clarity("???"),
            PulseEntry::new(day(1)).with_clarity("Focused"),
        ];
        let report = analyze_entries(&entries, &PulsemapConfig::default());
        assert_eq!(report.window.skipped[&SymptomKind::Clarity], 1);
        assert_eq!(report.statistics[&SymptomKind::Clarity].count, 1);
    }

    #[test]
    fn test_cached_analysis_reuses_report() {
        let registry = CacheRegistry::default();
        let config = PulsemapConfig::default();
        let entries: Vec<PulseEntry> = (0..10)
            .map(|i| PulseEntry::new(day(i)).with_climate(i as i32))
            .collect();

        let first = analyze_entries_cached(&registry, &entries, None, &config).unwrap();
        let second = analyze_entries_cached(&registry, &entries, None, &config).unwrap();

        assert_eq!(first, second);
        let stats = registry.cache(CacheGroup::Analysis).stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));

        analyze_entries_cached(&registry, &entries, Some("awful night"), &config).unwrap();
        assert_eq!(registry.cache(CacheGroup::Analysis).len(), 2);
    }
}
