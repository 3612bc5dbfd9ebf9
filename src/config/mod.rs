//! Configuration for the analytics engine and its caches.
//!
//! Every field has a serde default, so a `.pulsemap.toml` only needs to
//! mention the values it changes:
//!
//! ```toml
//! [statistics]
//! min_samples = 5
//!
//! [risk]
//! poor_sleep_mean = 3.5
//!
//! [cache.retrieval]
//! max_size = 200
//! ttl_secs = 900
//! ```

pub mod loader;
pub mod thresholds;

pub use loader::{load_config, load_config_from_path, parse_and_validate_config, CONFIG_FILE_NAME};
pub use thresholds::{
    AnalysisSettings, CacheConfig, CacheSettings, PatternConfig, RiskConfig, RiskWeights,
    StatisticsConfig,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PulsemapConfig {
    #[serde(default)]
    pub statistics: StatisticsConfig,
    #[serde(default)]
    pub patterns: PatternConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

impl PulsemapConfig {
    /// Check value ranges; returns every problem found rather than the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.statistics.min_samples < 2 {
            errors.push("statistics.min_samples must be at least 2".to_string());
        }
        let pct = self.statistics.trend_threshold_pct;
        if pct.is_nan() || pct < 0.0 {
            errors.push("statistics.trend_threshold_pct must be non-negative".to_string());
        }

        let patterns = &self.patterns;
        if patterns.min_overlap < 2 {
            errors.push("patterns.min_overlap must be at least 2".to_string());
        }
        if !(0.0..=1.0).contains(&patterns.min_cycle_confidence) {
            errors.push("patterns.min_cycle_confidence must be between 0 and 1".to_string());
        }
        if patterns.change_window == 0 {
            errors.push("patterns.change_window must be positive".to_string());
        }
        if patterns.iqr_multiplier.is_nan() || patterns.iqr_multiplier <= 0.0 {
            errors.push("patterns.iqr_multiplier must be positive".to_string());
        }

        let risk = &self.risk;
        if risk.window_days == 0 {
            errors.push("risk.window_days must be positive".to_string());
        }
        if risk.cluster_window == 0 {
            errors.push("risk.cluster_window must be positive".to_string());
        }
        if risk.high_score < risk.moderate_score {
            errors.push("risk.high_score must not be below risk.moderate_score".to_string());
        }
        if !(0.0..=10.0).contains(&risk.severe_threshold) {
            errors.push("risk.severe_threshold must be on the 0-10 scale".to_string());
        }
        if !(0.0..=10.0).contains(&risk.severe_brain_fog_mean) {
            errors.push("risk.severe_brain_fog_mean must be on the 0-10 scale".to_string());
        }

        for (name, settings) in [
            ("query_rewrite", &self.cache.query_rewrite),
            ("retrieval", &self.cache.retrieval),
            ("user_context", &self.cache.user_context),
            ("analysis", &self.cache.analysis),
        ] {
            if settings.max_size == 0 {
                errors.push(format!("cache.{}.max_size must be positive", name));
            }
        }

        if self.analysis.history_days == 0 {
            errors.push("analysis.history_days must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
