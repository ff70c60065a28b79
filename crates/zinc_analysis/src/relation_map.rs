//! The key → value-set container shared by every analysis table.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A mapping from a string key to a set of string values.
///
/// Every table of an analysis (relations, stamps, APIs, source infos,
/// compilations and compile setup) has this shape. Values are kept in a
/// sorted set, so duplicates collapse and iteration is always in
/// lexicographic order. A key never maps to an empty set: removing the last
/// value removes the key, which keeps structural equality in line with what
/// the text format can express.
///
/// Each map owns its keys and values outright. Cloning a map (or restricting
/// it with [`RelationMap::restrict`]) produces fully independent storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationMap(BTreeMap<String, BTreeSet<String>>);

impl RelationMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of `(key, value)` pairs, i.e. the number of items
    /// this table occupies in the text format.
    pub fn pair_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Adds `value` to the set stored under `key`.
    ///
    /// Returns `true` if the pair was not already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.0.entry(key.into()).or_default().insert(value.into())
    }

    /// Adds every value to the set stored under `key`.
    ///
    /// Does nothing (and creates no key) when `values` is empty.
    pub fn extend_key<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut values = values.into_iter().map(Into::into).peekable();
        if values.peek().is_none() {
            return;
        }
        match self.0.get_mut(key) {
            Some(set) => set.extend(values),
            None => {
                self.0.insert(key.to_string(), values.collect());
            }
        }
    }

    /// Replaces the value set stored under `key`, returning the previous one.
    ///
    /// An empty `values` set removes the key.
    pub fn replace(&mut self, key: impl Into<String>, values: BTreeSet<String>) -> Option<BTreeSet<String>> {
        let key = key.into();
        if values.is_empty() {
            self.0.remove(&key)
        } else {
            self.0.insert(key, values)
        }
    }

    /// Removes `key` and its values, returning the values if present.
    pub fn remove(&mut self, key: &str) -> Option<BTreeSet<String>> {
        self.0.remove(key)
    }

    /// Returns the value set stored under `key`.
    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.0.get(key)
    }

    /// Returns the smallest value stored under `key`.
    ///
    /// Tables such as stamps hold exactly one value per key; this is the
    /// natural accessor for them.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|set| set.first()).map(String::as_str)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns `true` if the `(key, value)` pair is present.
    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.0.get(key).is_some_and(|set| set.contains(value))
    }

    /// Iterates over keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over `(key, value set)` entries in sorted key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, BTreeSet<String>> {
        self.0.iter()
    }

    /// Iterates over every `(key, value)` pair, sorted by key then value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Iterates over every value of every key (values may repeat across keys).
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.values().flatten().map(String::as_str)
    }

    /// Returns a copy holding only the keys for which `keep` returns `true`.
    pub fn restrict<F>(&self, mut keep: F) -> RelationMap
    where
        F: FnMut(&str) -> bool,
    {
        RelationMap(
            self.0
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, vs)| (k.clone(), vs.clone()))
                .collect(),
        )
    }

    /// Rewrites every key through `key_fn` and every value through
    /// `value_fn`, merging entries whose keys collide after rewriting.
    pub fn try_rewrite<E, K, V>(&mut self, mut key_fn: K, mut value_fn: V) -> Result<(), E>
    where
        K: FnMut(&str) -> Result<String, E>,
        V: FnMut(&str) -> Result<String, E>,
    {
        let old = std::mem::take(&mut self.0);
        for (k, vs) in old {
            let new_key = key_fn(&k)?;
            let mut new_values = BTreeSet::new();
            for v in &vs {
                new_values.insert(value_fn(v)?);
            }
            self.0.entry(new_key).or_default().extend(new_values);
        }
        Ok(())
    }

    /// Keeps only the entries for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &BTreeSet<String>) -> bool,
    {
        self.0.retain(|k, vs| keep(k, vs));
    }
}

impl<K, V> FromIterator<(K, V)> for RelationMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RelationMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K, V> Extend<(K, V)> for RelationMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a> IntoIterator for &'a RelationMap {
    type Item = (&'a String, &'a BTreeSet<String>);
    type IntoIter = btree_map::Iter<'a, String, BTreeSet<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
