// Export modules for library usage
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod formatting;
pub mod io;
pub mod mapping;
pub mod patterns;
pub mod pipeline;
pub mod risk;
pub mod stats;

// Re-export commonly used types
pub use crate::core::{
    Polarity, PulseEntry, RawObservation, SeriesPoint, SeriesSet, SymptomKind, SymptomSeries,
    Trend,
};

pub use crate::mapping::{
    map_symptom_value, map_symptom_value_for, MappedValue, SeverityLabel, UnknownReason,
};

pub use crate::stats::{compute_all_statistics, compute_statistics, StatisticsSummary};

pub use crate::patterns::{
    calculate_correlations, detect_change_points, detect_cycles, detect_outliers,
    detect_patterns, detect_patterns_default, ChangePoint, DetectedCycle, PatternAnalysis,
    SymptomCorrelation,
};

pub use crate::risk::{
    assess_risk, assess_risk_with, RiskAssessment, RiskAssessor, RiskFlag, RiskLevel, RiskRule,
};

pub use crate::cache::{
    generate_cache_key, CacheGroup, CacheKey, CacheRegistry, CacheStats, Clock, KeyBuilder,
    ManualClock, SystemClock, TtlCache,
};

pub use crate::config::{load_config, load_config_from_path, PulsemapConfig};

pub use crate::errors::{Error, Result};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::pipeline::{
    analyze_entries, analyze_entries_cached, analyze_entries_with_notes, PulseReport,
};
