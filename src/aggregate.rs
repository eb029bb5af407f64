//! Column aggregations shared by the indicator and chart views.
//!
//! Missing values (`None`) and NaN are skipped everywhere: they never count
//! as distinct values, never win a maximum and never form a group key.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

fn valid(value: &Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Number of distinct non-missing values.
pub fn distinct_count<T: Eq + Hash>(values: &[Option<T>]) -> usize {
    values.iter().flatten().collect::<HashSet<_>>().len()
}

/// Sum of the valid values, `None` if there are none.
pub fn sum(values: &[Option<f64>]) -> Option<f64> {
    values
        .iter()
        .filter_map(valid)
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Row index and value of the first maximum.
pub fn first_max(values: &[Option<f64>]) -> Option<(usize, f64)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| valid(v).map(|v| (idx, v)))
        .fold(None, |best, (idx, v)| match best {
            Some((_, best_v)) if best_v >= v => best,
            _ => Some((idx, v)),
        })
}

/// Sums `values` per key. Rows without a key are dropped, missing values
/// add nothing to their group. Groups iterate in ascending key order.
pub fn group_sum<K: Ord + Clone>(keys: &[Option<K>], values: &[Option<f64>]) -> BTreeMap<K, f64> {
    let mut groups = BTreeMap::new();
    for (key, value) in keys.iter().zip(values.iter()) {
        if let Some(key) = key {
            *groups.entry(key.clone()).or_insert(0.0) += valid(value).unwrap_or(0.0);
        }
    }
    groups
}

/// Converts float years to integral group keys.
pub fn year_keys(values: &[Option<f64>]) -> Vec<Option<i64>> {
    values
        .iter()
        .map(|v| v.filter(|y| y.is_finite()).map(|y| y.trunc() as i64))
        .collect()
}

/// Group with the largest sum. Groups are visited in ascending key order,
/// so ties go to the smallest key.
pub fn max_group<K: Ord + Clone>(groups: &BTreeMap<K, f64>) -> Option<(K, f64)> {
    groups.iter().fold(None, |best, (key, &sum)| match best {
        Some((_, best_sum)) if best_sum >= sum => best,
        _ => Some((key.clone(), sum)),
    })
}

/// Indices of the `k` largest valid values, largest first. Equal values keep
/// their row order.
pub fn top_k(values: &[Option<f64>], k: usize) -> Vec<usize> {
    let mut indexed: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| valid(v).map(|v| (idx, v)))
        .collect();
    indexed.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    indexed.into_iter().take(k).map(|(idx, _)| idx).collect()
}
