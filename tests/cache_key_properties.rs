//! Property-based tests for cache key generation
//!
//! - Keys are deterministic and keep their namespace prefix
//! - Distinct arguments produce distinct keys
//! - Map arguments hash the same whatever their insertion order
//! - Finite floats never share a key with NaN, the infinities or `None`

use proptest::prelude::*;
use pulsemap::cache::{generate_cache_key, KeyBuilder};
use serde_json::json;
use std::collections::HashMap;

fn prefix() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,15}"
}

proptest! {
    #[test]
    fn prop_key_is_deterministic(p in prefix(), text in ".{0,40}", n in any::<i64>()) {
        let first = generate_cache_key(&p, &[json!(text), json!(n)]);
        let second = generate_cache_key(&p, &[json!(text), json!(n)]);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_key_keeps_prefix(p in prefix(), text in ".{0,40}") {
        let key = generate_cache_key(&p, &[json!(text)]);

        prop_assert_eq!(key.prefix(), p.as_str());
        let expected_start = format!("{}:", p);
        prop_assert!(key.as_str().starts_with(&expected_start));
        prop_assert_eq!(key.digest().len(), 64);
    }

    #[test]
    fn prop_distinct_args_give_distinct_keys(a in ".{0,40}", b in ".{0,40}") {
        prop_assume!(a != b);
        prop_assert_ne!(
            generate_cache_key("retrieval", &[json!(a)]),
            generate_cache_key("retrieval", &[json!(b)])
        );
    }

    #[test]
    fn prop_argument_boundaries_matter(a in "[a-z]{1,10}", b in "[a-z]{1,10}") {
        let split = generate_cache_key("q", &[json!(a), json!(b)]);
        let joined = generate_cache_key("q", &[json!(format!("{a}{b}"))]);
        prop_assert_ne!(split, joined);
    }

    #[test]
    fn prop_map_order_does_not_matter(
        pairs in prop::collection::btree_map("[a-z]{1,8}", any::<u32>(), 0..12)
    ) {
        let forward: HashMap<_, _> = pairs.iter().collect();
        let reverse: HashMap<_, _> = pairs.iter().rev().collect();

        let a = KeyBuilder::new("user_context").arg(&forward).finish();
        let b = KeyBuilder::new("user_context").arg(&reverse).finish();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_finite_floats_stay_apart_from_non_finite(
        x in any::<f64>().prop_filter("finite", |x| x.is_finite())
    ) {
        let key = |value: Option<f64>| KeyBuilder::new("score").arg(&value).finish();
        let finite = key(Some(x));

        prop_assert_ne!(&finite, &key(Some(f64::NAN)));
        prop_assert_ne!(&finite, &key(Some(f64::INFINITY)));
        prop_assert_ne!(&finite, &key(Some(f64::NEG_INFINITY)));
        prop_assert_ne!(&finite, &key(None));
    }
}

#[test]
fn test_prefix_separates_namespaces() {
    let args = [json!("night sweats")];
    assert_ne!(
        generate_cache_key("query_rewrite", &args),
        generate_cache_key("retrieval", &args)
    );
}
