use serde::{Deserialize, Serialize};

/// Statistics engine thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Minimum number of mapped points before a trend may be claimed
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Relative change (percent) between window halves below which a symptom is stable
    #[serde(default = "default_trend_threshold_pct")]
    pub trend_threshold_pct: f64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            trend_threshold_pct: default_trend_threshold_pct(),
        }
    }
}

fn default_min_samples() -> usize {
    3
}
fn default_trend_threshold_pct() -> f64 {
    10.0
}

/// Pattern detector thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Minimum points per series for outlier and trend analysis
    #[serde(default = "default_min_points")]
    pub min_points: usize,

    /// Minimum same-day overlap before a correlation is reported
    #[serde(default = "default_min_overlap")]
    pub min_overlap: usize,

    /// Autocorrelation magnitude a cycle must exceed to be reported
    #[serde(default = "default_min_cycle_confidence")]
    pub min_cycle_confidence: f64,

    /// Tukey fence multiplier for outliers
    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,

    #[serde(default = "default_max_outliers")]
    pub max_outliers: usize,

    /// Points on each side of a candidate change point
    #[serde(default = "default_change_window")]
    pub change_window: usize,

    /// Mean shift (scale points) that marks a change point
    #[serde(default = "default_change_threshold")]
    pub change_threshold: f64,

    #[serde(default = "default_max_change_points")]
    pub max_change_points: usize,

    /// Regression slope (points per day) below which the overall trend is stable
    #[serde(default = "default_stable_slope")]
    pub stable_slope: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_points: default_min_points(),
            min_overlap: default_min_overlap(),
            min_cycle_confidence: default_min_cycle_confidence(),
            iqr_multiplier: default_iqr_multiplier(),
            max_outliers: default_max_outliers(),
            change_window: default_change_window(),
            change_threshold: default_change_threshold(),
            max_change_points: default_max_change_points(),
            stable_slope: default_stable_slope(),
        }
    }
}

fn default_min_points() -> usize {
    7
}
fn default_min_overlap() -> usize {
    3
}
fn default_min_cycle_confidence() -> f64 {
    0.3
}
fn default_iqr_multiplier() -> f64 {
    1.5
}
fn default_max_outliers() -> usize {
    5
}
fn default_change_window() -> usize {
    7
}
fn default_change_threshold() -> f64 {
    2.0
}
fn default_max_change_points() -> usize {
    3
}
fn default_stable_slope() -> f64 {
    0.05
}

/// Risk rule thresholds and weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Entries required before any rule is evaluated
    #[serde(default = "default_min_entries")]
    pub min_entries: usize,

    /// Size of the "recent" window (entries)
    #[serde(default = "default_window_days")]
    pub window_days: usize,

    /// Rest quality mean below which sleep counts as persistently poor
    #[serde(default = "default_poor_sleep_mean")]
    pub poor_sleep_mean: f64,

    /// Severity at or above which a reading is severe
    #[serde(default = "default_severe_threshold")]
    pub severe_threshold: f64,

    #[serde(default = "default_severe_climate_min_count")]
    pub severe_climate_min_count: usize,

    /// Consecutive entries inspected for co-occurring severe symptoms
    #[serde(default = "default_cluster_window")]
    pub cluster_window: usize,

    #[serde(default = "default_min_severe_dimensions")]
    pub min_severe_dimensions: usize,

    /// Week-over-week worsening (scale points) that counts as rapid
    #[serde(default = "default_deterioration_points")]
    pub deterioration_points: f64,

    /// Clarity severity mean above which brain fog counts as severe
    #[serde(default = "default_severe_brain_fog_mean")]
    pub severe_brain_fog_mean: f64,

    #[serde(default = "default_concerning_keywords")]
    pub concerning_keywords: Vec<String>,

    #[serde(default)]
    pub weights: RiskWeights,

    #[serde(default = "default_moderate_score")]
    pub moderate_score: u32,

    #[serde(default = "default_high_score")]
    pub high_score: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            min_entries: default_min_entries(),
            window_days: default_window_days(),
            poor_sleep_mean: default_poor_sleep_mean(),
            severe_threshold: default_severe_threshold(),
            severe_climate_min_count: default_severe_climate_min_count(),
            cluster_window: default_cluster_window(),
            min_severe_dimensions: default_min_severe_dimensions(),
            deterioration_points: default_deterioration_points(),
            severe_brain_fog_mean: default_severe_brain_fog_mean(),
            concerning_keywords: default_concerning_keywords(),
            weights: RiskWeights::default(),
            moderate_score: default_moderate_score(),
            high_score: default_high_score(),
        }
    }
}

fn default_min_entries() -> usize {
    7
}
fn default_window_days() -> usize {
    7
}
fn default_poor_sleep_mean() -> f64 {
    4.0
}
fn default_severe_threshold() -> f64 {
    7.0
}
fn default_severe_climate_min_count() -> usize {
    3
}
fn default_cluster_window() -> usize {
    3
}
fn default_min_severe_dimensions() -> usize {
    3
}
fn default_deterioration_points() -> f64 {
    2.0
}
fn default_severe_brain_fog_mean() -> f64 {
    7.0
}
fn default_concerning_keywords() -> Vec<String> {
    [
        "unbearable",
        "emergency",
        "extreme",
        "can't",
        "cannot",
        "terrible",
        "awful",
        "hopeless",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_moderate_score() -> u32 {
    3
}
fn default_high_score() -> u32 {
    6
}

/// Score contributed by each triggered rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskWeights {
    #[serde(default = "default_weight_two")]
    pub persistent_poor_sleep: u32,
    #[serde(default = "default_weight_three")]
    pub severe_hot_flashes: u32,
    #[serde(default = "default_weight_three")]
    pub concerning_user_notes: u32,
    #[serde(default = "default_weight_two")]
    pub multiple_severe_symptoms: u32,
    #[serde(default = "default_weight_three")]
    pub rapid_deterioration: u32,
    #[serde(default = "default_weight_one")]
    pub severe_brain_fog: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            persistent_poor_sleep: default_weight_two(),
            severe_hot_flashes: default_weight_three(),
            concerning_user_notes: default_weight_three(),
            multiple_severe_symptoms: default_weight_two(),
            rapid_deterioration: default_weight_three(),
            severe_brain_fog: default_weight_one(),
        }
    }
}

fn default_weight_one() -> u32 {
    1
}
fn default_weight_two() -> u32 {
    2
}
fn default_weight_three() -> u32 {
    3
}

/// Capacity and lifetime of one cache instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    pub max_size: usize,
    pub ttl_secs: u64,
}

impl CacheSettings {
    pub const fn new(max_size: usize, ttl_secs: u64) -> Self {
        Self { max_size, ttl_secs }
    }

    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::new(100, 300)
    }
}

/// Per-concern cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_query_rewrite_cache")]
    pub query_rewrite: CacheSettings,
    #[serde(default = "default_retrieval_cache")]
    pub retrieval: CacheSettings,
    #[serde(default = "default_user_context_cache")]
    pub user_context: CacheSettings,
    #[serde(default = "default_analysis_cache")]
    pub analysis: CacheSettings,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            query_rewrite: default_query_rewrite_cache(),
            retrieval: default_retrieval_cache(),
            user_context: default_user_context_cache(),
            analysis: default_analysis_cache(),
        }
    }
}

fn default_query_rewrite_cache() -> CacheSettings {
    CacheSettings::new(100, 300)
}
fn default_retrieval_cache() -> CacheSettings {
    CacheSettings::new(100, 600)
}
fn default_user_context_cache() -> CacheSettings {
    CacheSettings::new(10, 180)
}
fn default_analysis_cache() -> CacheSettings {
    CacheSettings::new(50, 180)
}

/// Pipeline-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Most recent entries considered by statistics and patterns
    #[serde(default = "default_history_days")]
    pub history_days: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
        }
    }
}

fn default_history_days() -> usize {
    30
}
