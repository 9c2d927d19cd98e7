//! Metric functions
//!
//! Every metric takes the true labels and the predicted scores of equal
//! length and returns one scalar. A label greater than zero counts as
//! relevant / positive.

use rankprep_core::{Error, Result};
use std::cmp::Ordering;

/// Probabilities are clipped to `[LOG_LOSS_EPS, 1 - LOG_LOSS_EPS]`
pub const LOG_LOSS_EPS: f64 = f64::EPSILON;

fn check_inputs(y_true: &[f64], y_score: &[f64]) -> Result<()> {
    if y_true.len() != y_score.len() {
        return Err(Error::InvalidInput(format!(
            "{} true labels but {} predictions",
            y_true.len(),
            y_score.len()
        )));
    }
    if y_true.is_empty() {
        return Err(Error::InvalidInput("no samples to evaluate".to_string()));
    }
    if y_true.iter().chain(y_score).any(|v| v.is_nan()) {
        return Err(Error::InvalidInput("NaN in metric input".to_string()));
    }
    Ok(())
}

#[inline]
fn is_positive(label: f64) -> bool {
    label > 0.0
}

/// Indices sorted by descending score, stable on ties
fn descending_order(y_score: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|&a, &b| {
        y_score[b]
            .partial_cmp(&y_score[a])
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Consecutive runs of equal scores in `order`
fn tie_groups<'a>(order: &'a [usize], y_score: &[f64]) -> Vec<&'a [usize]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for end in 1..=order.len() {
        if end == order.len() || y_score[order[end]] != y_score[order[start]] {
            groups.push(&order[start..end]);
            start = end;
        }
    }
    groups
}

/// Area under the ROC curve
///
/// Computed from average ranks, so tied scores count one half. Both
/// classes must be present.
pub fn roc_auc_score(y_true: &[f64], y_score: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_score)?;
    let n_pos = y_true.iter().filter(|&&y| is_positive(y)).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(Error::InvalidInput(
            "ROC AUC is undefined when only one class is present".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|&a, &b| {
        y_score[a]
            .partial_cmp(&y_score[b])
            .unwrap_or(Ordering::Equal)
    });

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    for group in tie_groups(&order, y_score) {
        // average of the 1-based ranks start+1 ..= start+len
        let average_rank = start as f64 + (group.len() as f64 + 1.0) / 2.0;
        let positives = group.iter().filter(|&&i| is_positive(y_true[i])).count();
        positive_rank_sum += average_rank * positives as f64;
        start += group.len();
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Ok((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Binary cross-entropy of the positive-class probabilities
pub fn log_loss(y_true: &[f64], y_prob: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_prob)?;
    let total: f64 = y_true
        .iter()
        .zip(y_prob)
        .map(|(&y, &p)| {
            let p = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
            if is_positive(y) {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    Ok(total / y_true.len() as f64)
}

/// Mean squared difference between outcome and probability
pub fn brier_score_loss(y_true: &[f64], y_prob: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_prob)?;
    let total: f64 = y_true
        .iter()
        .zip(y_prob)
        .map(|(&y, &p)| {
            let outcome = if is_positive(y) { 1.0 } else { 0.0 };
            (outcome - p).powi(2)
        })
        .sum();
    Ok(total / y_true.len() as f64)
}

/// Average precision: precision at each distinct threshold weighted by
/// the recall it adds
pub fn average_precision_score(y_true: &[f64], y_score: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_score)?;
    let n_pos = y_true.iter().filter(|&&y| is_positive(y)).count();
    if n_pos == 0 {
        return Err(Error::InvalidInput(
            "average precision is undefined without positive samples".to_string(),
        ));
    }

    let order = descending_order(y_score);
    let (mut tp, mut seen) = (0usize, 0usize);
    let mut previous_recall = 0.0;
    let mut ap = 0.0;
    for group in tie_groups(&order, y_score) {
        tp += group.iter().filter(|&&i| is_positive(y_true[i])).count();
        seen += group.len();
        let recall = tp as f64 / n_pos as f64;
        let precision = tp as f64 / seen as f64;
        ap += (recall - previous_recall) * precision;
        previous_recall = recall;
    }
    Ok(ap)
}

#[inline]
fn discount(position: usize) -> f64 {
    1.0 / ((position + 2) as f64).log2()
}

/// Discounted cumulative gain
///
/// Linear gains and `1 / log2(rank + 1)` discounts. Documents with tied
/// scores share the average gain of their tie group.
pub fn dcg_score(y_true: &[f64], y_score: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_score)?;
    Ok(tie_averaged_dcg(y_true, y_score))
}

fn tie_averaged_dcg(y_true: &[f64], y_score: &[f64]) -> f64 {
    let order = descending_order(y_score);
    let mut dcg = 0.0;
    let mut start = 0;
    for group in tie_groups(&order, y_score) {
        let gain = group.iter().map(|&i| y_true[i]).sum::<f64>() / group.len() as f64;
        let discounts: f64 = (start..start + group.len()).map(discount).sum();
        dcg += gain * discounts;
        start += group.len();
    }
    dcg
}

fn ideal_dcg(y_true: &[f64]) -> f64 {
    let mut gains = y_true.to_vec();
    gains.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    gains
        .iter()
        .enumerate()
        .map(|(position, gain)| gain * discount(position))
        .sum()
}

/// DCG normalized by the DCG of the ideal ordering
///
/// Needs at least two documents and non-negative labels. A query without
/// any relevant document scores 0.
pub fn ndcg_score(y_true: &[f64], y_score: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_score)?;
    if y_true.len() < 2 {
        return Err(Error::InvalidInput(
            "NDCG needs at least two documents".to_string(),
        ));
    }
    if y_true.iter().any(|&y| y < 0.0) {
        return Err(Error::InvalidInput(
            "NDCG needs non-negative relevance labels".to_string(),
        ));
    }

    let ideal = ideal_dcg(y_true);
    if ideal == 0.0 {
        return Ok(0.0);
    }
    Ok(tie_averaged_dcg(y_true, y_score) / ideal)
}

/// Inverse rank of the best scored relevant document, 0 if none
///
/// Documents scored strictly higher push the rank down; ties do not.
pub fn reciprocal_rank(y_true: &[f64], y_score: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_score)?;
    let best = y_true
        .iter()
        .zip(y_score)
        .filter(|(&y, _)| is_positive(y))
        .map(|(_, &s)| s)
        .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))));

    Ok(match best {
        Some(best) => {
            let higher = y_score.iter().filter(|&&s| s > best).count();
            1.0 / (higher + 1) as f64
        }
        None => 0.0,
    })
}
