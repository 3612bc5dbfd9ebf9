//! Deterministic cache keys.
//!
//! A key is `"{prefix}:{sha256}"` where the digest covers the prefix, the
//! number of arguments and each argument's canonical JSON encoding, every
//! piece length-prefixed. Arguments are normalized into a sorted
//! [`serde_json::Value`] tree first, so map-typed arguments hash the same
//! regardless of iteration order. NaN, the infinities and `None` each hash
//! to a distinct marker.

use super::canonical::to_canonical_bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace part of the key, empty when no prefix was given.
    pub fn prefix(&self) -> &str {
        match self.0.rsplit_once(':') {
            Some((prefix, _)) => prefix,
            None => "",
        }
    }

    /// Hex digest part of the key.
    pub fn digest(&self) -> &str {
        match self.0.rsplit_once(':') {
            Some((_, digest)) => digest,
            None => &self.0,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

/// Incrementally hashes arguments into a [`CacheKey`].
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    prefix: String,
    args: Vec<Vec<u8>>,
}

impl KeyBuilder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.args.push(canonical_bytes(value));
        self
    }

    pub fn finish(self) -> CacheKey {
        let mut hasher = Sha256::new();
        update_framed(&mut hasher, self.prefix.as_bytes());
        hasher.update((self.args.len() as u64).to_le_bytes());
        for arg in &self.args {
            update_framed(&mut hasher, arg);
        }
        let digest = format!("{:x}", hasher.finalize());

        if self.prefix.is_empty() {
            CacheKey(digest)
        } else {
            CacheKey(format!("{}:{}", self.prefix, digest))
        }
    }
}

/// Key for a list of already-JSON arguments.
pub fn generate_cache_key(prefix: &str, args: &[serde_json::Value]) -> CacheKey {
    args.iter()
        .fold(KeyBuilder::new(prefix), |builder, arg| builder.arg(arg))
        .finish()
}

fn update_framed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    match to_canonical_bytes(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            let type_name = std::any::type_name::<T>();
            log::warn!("Cache key argument of type {} is not serializable: {}", type_name, e);
            format!("<unserializable:{}>", type_name).into_bytes()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_key_shape() {
        let key = KeyBuilder::new("retrieval").arg("hot flashes").arg(&5).finish();
        assert!(key.as_str().starts_with("retrieval:"));
        assert_eq!(key.prefix(), "retrieval");
        assert_eq!(key.digest().len(), 64);
        assert!(key.digest().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_empty_prefix_is_bare_digest() {
        let key = generate_cache_key("", &[json!("q")]);
        assert_eq!(key.as_str().len(), 64);
        assert_eq!(key.prefix(), "");
    }

    #[test]
    fn test_same_inputs_same_key() {
        let a = generate_cache_key("rewrite", &[json!("sleep"), json!({"k": 3})]);
        let b = generate_cache_key("rewrite", &[json!("sleep"), json!({"k": 3})]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_argument_boundaries_matter() {
        let joined = generate_cache_key("p", &[json!("ab")]);
        let split = generate_cache_key("p", &[json!("a"), json!("b")]);
        assert_ne!(joined, split);

        let none = generate_cache_key("p", &[]);
        let empty = generate_cache_key("p", &[json!("")]);
        assert_ne!(none, empty);
    }

    #[test]
    fn test_prefix_matters() {
        let args = [json!(1)];
        assert_ne!(generate_cache_key("a", &args), generate_cache_key("b", &args));
    }

    #[test]
    fn test_map_order_does_not_matter() {
        let mut first = HashMap::new();
        let mut second = HashMap::new();
        for i in 0..20 {
            first.insert(format!("k{}", i), i);
        }
        for i in (0..20).rev() {
            second.insert(format!("k{}", i), i);
        }

        let a = KeyBuilder::new("ctx").arg(&first).finish();
        let b = KeyBuilder::new("ctx").arg(&second).finish();
        assert_eq!(a, b);
    }

    #[test]
    fn test_builder_matches_json_helper() {
        let typed = KeyBuilder::new("q").arg("text").arg(&3).finish();
        let json = generate_cache_key("q", &[json!("text"), json!(3)]);
        assert_eq!(typed, json);
    }

    #[test]
    fn test_non_finite_floats_get_distinct_keys() {
        let key = |value: Option<f64>| KeyBuilder::new("score").arg(&value).finish();

        let nan = key(Some(f64::NAN));
        let inf = key(Some(f64::INFINITY));
        let neg_inf = key(Some(f64::NEG_INFINITY));
        let missing = key(None);

        assert_ne!(nan, inf);
        assert_ne!(nan, neg_inf);
        assert_ne!(inf, neg_inf);
        assert_ne!(nan, missing);
        assert_ne!(inf, missing);
        assert_ne!(neg_inf, missing);
        assert_eq!(nan, key(Some(f64::NAN)));
    }

    #[test]
    fn test_unserializable_argument_falls_back() {
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);

        let key = KeyBuilder::new("x").arg(&bad).finish();
        assert_eq!(key, KeyBuilder::new("x").arg(&bad).finish());
        assert_eq!(key.prefix(), "x");
    }
}
