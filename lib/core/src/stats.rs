//! Descriptive statistics over columns with missing values
//!
//! All functions skip missing cells (`None` and NaN) and return `None` when
//! nothing is left to aggregate.

use std::collections::BTreeMap;

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| v.filter(|x| !x.is_nan()))
        .collect()
}

pub fn count(values: &[Option<f64>]) -> usize {
    values.iter().filter(|v| v.map_or(false, |x| !x.is_nan())).count()
}

pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present = present(values);
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Sample standard deviation (one delta degree of freedom)
///
/// A single observation has no spread and yields `0.0`.
pub fn std_dev(values: &[Option<f64>]) -> Option<f64> {
    let present = present(values);
    match present.len() {
        0 => None,
        1 => Some(0.0),
        n => {
            let mean = present.iter().sum::<f64>() / n as f64;
            let sum_sq: f64 = present.iter().map(|x| (x - mean) * (x - mean)).sum();
            Some((sum_sq / (n - 1) as f64).sqrt())
        }
    }
}

pub fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut present = present(values);
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

pub fn min(values: &[Option<f64>]) -> Option<f64> {
    present(values).into_iter().reduce(f64::min)
}

pub fn max(values: &[Option<f64>]) -> Option<f64> {
    present(values).into_iter().reduce(f64::max)
}

/// Most frequent value; the smallest one wins a tie
pub fn mode(values: &[Option<f64>]) -> Option<f64> {
    let mut present = present(values);
    present.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < present.len() {
        let value = present[i];
        let run = present[i..].iter().take_while(|&&x| x == value).count();
        if best.map_or(true, |(_, n)| run > n) {
            best = Some((value, run));
        }
        i += run;
    }
    best.map(|(value, _)| value)
}

/// Most frequent label; the lexicographically smallest one wins a tie
pub fn mode_label(values: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, n) in counts {
        if best.map_or(true, |(_, best_n)| n > best_n) {
            best = Some((label, n));
        }
    }
    best.map(|(label, _)| label.to_string())
}

/// Distinct non-missing values in ascending order
pub fn distinct_values(values: &[Option<f64>]) -> Vec<f64> {
    let mut present = present(values);
    present.sort_by(f64::total_cmp);
    present.dedup_by(|a, b| a.total_cmp(b).is_eq());
    present
}

/// Distinct non-missing labels in sorted order
pub fn distinct_labels(values: &[Option<String>]) -> Vec<String> {
    let mut labels: Vec<String> = values.iter().flatten().cloned().collect();
    labels.sort();
    labels.dedup();
    labels
}
