use super::clock::{Clock, SystemClock};
use super::key::CacheKey;
use super::ttl_cache::{CacheStats, TtlCache};
use crate::config::{CacheConfig, CacheSettings};
use crate::errors::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Independent cache namespaces, each with its own capacity and lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheGroup {
    QueryRewrite,
    Retrieval,
    UserContext,
    Analysis,
}

impl CacheGroup {
    pub const ALL: [CacheGroup; 4] = [
        CacheGroup::QueryRewrite,
        CacheGroup::Retrieval,
        CacheGroup::UserContext,
        CacheGroup::Analysis,
    ];

    /// Key prefix used for entries in this group.
    pub fn as_str(self) -> &'static str {
        match self {
            CacheGroup::QueryRewrite => "query_rewrite",
            CacheGroup::Retrieval => "retrieval",
            CacheGroup::UserContext => "user_context",
            CacheGroup::Analysis => "analysis",
        }
    }

    fn settings(self, config: &CacheConfig) -> CacheSettings {
        match self {
            CacheGroup::QueryRewrite => config.query_rewrite,
            CacheGroup::Retrieval => config.retrieval,
            CacheGroup::UserContext => config.user_context,
            CacheGroup::Analysis => config.analysis,
        }
    }
}

impl fmt::Display for CacheGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns one JSON-valued [`TtlCache`] per [`CacheGroup`].
///
/// Pass the registry by reference (or inside an `Arc`) to whatever needs
/// caching; there is no process-wide instance.
#[derive(Debug)]
pub struct CacheRegistry {
    query_rewrite: TtlCache<serde_json::Value>,
    retrieval: TtlCache<serde_json::Value>,
    user_context: TtlCache<serde_json::Value>,
    analysis: TtlCache<serde_json::Value>,
}

impl CacheRegistry {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let build = |group: CacheGroup| -> TtlCache<serde_json::Value> {
            TtlCache::with_clock(group.settings(config), Arc::clone(&clock)).named(group.as_str())
        };
        Self {
            query_rewrite: build(CacheGroup::QueryRewrite),
            retrieval: build(CacheGroup::Retrieval),
            user_context: build(CacheGroup::UserContext),
            analysis: build(CacheGroup::Analysis),
        }
    }

    pub fn cache(&self, group: CacheGroup) -> &TtlCache<serde_json::Value> {
        match group {
            CacheGroup::QueryRewrite => &self.query_rewrite,
            CacheGroup::Retrieval => &self.retrieval,
            CacheGroup::UserContext => &self.user_context,
            CacheGroup::Analysis => &self.analysis,
        }
    }

    /// Drop every entry in one group; other groups are untouched.
    pub fn invalidate(&self, group: CacheGroup) {
        self.cache(group).clear();
    }

    pub fn clear_all(&self) {
        for group in CacheGroup::ALL {
            self.invalidate(group);
        }
    }

    pub fn stats(&self) -> BTreeMap<CacheGroup, CacheStats> {
        CacheGroup::ALL
            .into_iter()
            .map(|group| (group, self.cache(group).stats()))
            .collect()
    }

    /// Fetch a typed value from `group`, computing and storing it on a miss.
    ///
    /// Values are stored as JSON. A cached value that no longer decodes as
    /// `T` is treated as a miss and overwritten.
    pub fn cached_json<T, F>(
        &self,
        group: CacheGroup,
        key: &CacheKey,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        let cache = self.cache(group);

        if let Some(raw) = cache.get(key.as_str()) {
            match serde_json::from_value(raw) {
                Ok(value) => return Ok(value),
                Err(e) => log::warn!("[{}] discarding undecodable entry {}: {}", group, key, e),
            }
        }

        let value = compute()?;
        let encoded = serde_json::to_value(&value)?;
        cache.set(key.as_str(), encoded, ttl.unwrap_or_else(|| cache.default_ttl()));
        Ok(value)
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
