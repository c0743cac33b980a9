//! Property-Based Tests for the Set Cache
//!
//! # Test Properties
//!
//! 1. **Key Isolation**: removing one key never changes another key's value
//! 2. **Last Write Wins**: the value read for a key is the last one written

#![cfg(test)]

use std::collections::HashMap;
use std::time::Duration;

use proptest::prelude::*;

use super::SetCache;

const TTL: Duration = Duration::from_secs(3600);

/// Strategy for a sequence of writes over a small key space so keys repeat.
fn writes_strategy() -> impl Strategy<Value = Vec<(u8, i64)>> {
    prop::collection::vec((0u8..16, any::<i64>()), 1..64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: after any write sequence every key reads its last written value.
    #[test]
    fn prop_last_write_wins(writes in writes_strategy()) {
        let cache = SetCache::new("prop");
        let mut expected = HashMap::new();

        for (key, value) in &writes {
            cache.set(*key, *value, TTL);
            expected.insert(*key, *value);
        }

        prop_assert_eq!(cache.len(), expected.len());
        for (key, value) in &expected {
            prop_assert_eq!(cache.get(key), Some(*value));
        }
    }

    /// Property: removing one key leaves every other key untouched.
    #[test]
    fn prop_remove_is_isolated(writes in writes_strategy(), victim in 0u8..16) {
        let cache = SetCache::new("prop");
        let mut expected = HashMap::new();

        for (key, value) in &writes {
            cache.set(*key, *value, TTL);
            expected.insert(*key, *value);
        }

        cache.remove(&victim);
        expected.remove(&victim);

        prop_assert_eq!(cache.get(&victim), None);
        for (key, value) in &expected {
            prop_assert_eq!(cache.get(key), Some(*value));
        }
    }
}
