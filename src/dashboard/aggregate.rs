use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;

/// Category label -> count. Label order is emission order; equality ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Series {
    counts: IndexMap<String, u64>,
}

impl Series {
    pub fn labels(&self) -> Vec<&str> {
        self.counts.keys().map(String::as_str).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.counts.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

impl<const N: usize> From<[(&str, u64); N]> for Series {
    fn from(pairs: [(&str, u64); N]) -> Self {
        Self {
            counts: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }
}

/// Count records per category key.
///
/// With `fixed`, the result holds exactly those categories in that order,
/// zero-filled, and records whose key matches none of them (case-insensitively)
/// are skipped. Without it, categories are the observed keys in first-seen
/// order. Records whose key is `None` are never counted.
pub fn aggregate_counts<'a, T, F>(records: &'a [T], key_fn: F, fixed: Option<&[&str]>) -> Series
where
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut counts: IndexMap<String, u64> = IndexMap::new();

    match fixed {
        Some(categories) => {
            for category in categories {
                counts.entry(category.to_string()).or_insert(0);
            }
            for key in records.iter().filter_map(&key_fn) {
                let key = key.to_lowercase();
                if let Some(category) = categories.iter().find(|c| c.to_lowercase() == key) {
                    if let Some(count) = counts.get_mut(*category) {
                        *count += 1;
                    }
                }
            }
        }
        None => {
            for key in records.iter().filter_map(&key_fn) {
                *counts.entry(key.to_string()).or_insert(0) += 1;
            }
        }
    }

    Series { counts }
}

/// Number of distinct values `key_fn` yields across `records`.
pub fn distinct_count<'a, T, K, F>(records: &'a [T], key_fn: F) -> u64
where
    K: Hash + Eq,
    F: Fn(&'a T) -> K,
{
    records.iter().map(key_fn).collect::<HashSet<_>>().len() as u64
}

/// Number of sub-items across all records that satisfy `pred`.
pub fn nested_count<T, S, F, P>(records: &[T], items: F, pred: P) -> u64
where
    F: Fn(&T) -> &[S],
    P: Fn(&S) -> bool,
{
    records
        .iter()
        .map(|r| items(r).iter().filter(|s| pred(s)).count() as u64)
        .sum()
}
