//! Time-bound caching for expensive boundary calls.
//!
//! [`TtlCache`] is the storage primitive, [`KeyBuilder`] produces stable keys
//! from arbitrary serializable arguments, and [`CacheRegistry`] groups one
//! cache per concern so each can be sized, expired and invalidated on its own.

mod canonical;
pub mod clock;
pub mod key;
pub mod registry;
pub mod ttl_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{generate_cache_key, CacheKey, KeyBuilder};
pub use registry::{CacheGroup, CacheRegistry};
pub use ttl_cache::{CacheStats, TtlCache};
