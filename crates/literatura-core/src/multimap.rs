//! Deterministic two-level multimap helpers.
//!
//! Directory dependencies and entry weights are both keyed two levels deep
//! (`tail → head → values`). These helpers play the role of a
//! default-dict-of-default-dict: missing levels are created on first use.
//! Everything is backed by [`BTreeMap`] so iteration order is sorted and
//! stable across runs.

use std::collections::BTreeMap;

/// `outer → inner → Vec<V>`.
pub type NestedMultiMap<K1, K2, V> = BTreeMap<K1, BTreeMap<K2, Vec<V>>>;

/// `outer → inner → count`.
pub type NestedCounts<K1, K2> = BTreeMap<K1, BTreeMap<K2, usize>>;

/// Return the inner map for `outer`, creating it if absent.
pub fn nested_entry<K1: Ord, K2: Ord, V>(
    map: &mut BTreeMap<K1, BTreeMap<K2, V>>,
    outer: K1,
) -> &mut BTreeMap<K2, V> {
    map.entry(outer).or_default()
}

/// Append `value` under `outer → inner`.
pub fn push_nested<K1: Ord, K2: Ord, V>(
    map: &mut NestedMultiMap<K1, K2, V>,
    outer: K1,
    inner: K2,
    value: V,
) {
    nested_entry(map, outer).entry(inner).or_default().push(value);
}

/// Increment the counter under `outer → inner`.
pub fn count_nested<K1: Ord, K2: Ord>(map: &mut NestedCounts<K1, K2>, outer: K1, inner: K2) {
    *nested_entry(map, outer).entry(inner).or_insert(0) += 1;
}

/// Flatten `tail → heads` into sorted `(tail, head)` pairs.
pub fn flatten<'a, K: Ord, V>(map: &'a BTreeMap<K, BTreeMap<K, V>>) -> Vec<(&'a K, &'a K)> {
    map.iter()
        .flat_map(|(tail, heads)| heads.keys().map(move |head| (tail, head)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BTreeMap<&'static str, BTreeMap<&'static str, ()>> {
        BTreeMap::from([
            ("a", BTreeMap::from([("b", ())])),
            ("b", BTreeMap::from([("d", ()), ("c", ())])),
        ])
    }

    #[test]
    fn push_nested_creates_missing_levels() {
        let mut map: NestedMultiMap<String, String, u32> = BTreeMap::new();
        push_nested(&mut map, "a".into(), "b".into(), 1);
        push_nested(&mut map, "a".into(), "b".into(), 2);
        push_nested(&mut map, "a".into(), "c".into(), 3);

        assert_eq!(map["a"]["b"], vec![1, 2]);
        assert_eq!(map["a"]["c"], vec![3]);
    }

    #[test]
    fn count_nested_accumulates() {
        let mut counts: NestedCounts<&str, &str> = BTreeMap::new();
        count_nested(&mut counts, "src/", "lib/");
        count_nested(&mut counts, "src/", "lib/");
        count_nested(&mut counts, "src/", "main.rs");

        assert_eq!(counts["src/"]["lib/"], 2);
        assert_eq!(counts["src/"]["main.rs"], 1);
    }

    #[test]
    fn flatten_is_sorted() {
        let map = sample();
        assert_eq!(
            flatten(&map),
            vec![(&"a", &"b"), (&"b", &"c"), (&"b", &"d")]
        );
    }
}
