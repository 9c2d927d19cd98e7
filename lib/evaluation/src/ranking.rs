//! Per-query ranking evaluation
//!
//! Rows are grouped by query; each group is scored as one ranked list and
//! the per-query scores are averaged. Groups with fewer than two rows or
//! without any relevant row carry no ranking signal and are skipped.

use crate::registry::{MetricFn, MetricRegistry};
use rankprep_core::{Dataset, Error, Result};
use rankprep_schema::Schema;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// True labels and predicted scores of one query, in row order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryGroup {
    pub query: String,
    pub y_true: Vec<f64>,
    pub y_score: Vec<f64>,
}

impl QueryGroup {
    pub fn new(query: impl Into<String>, y_true: Vec<f64>, y_score: Vec<f64>) -> Self {
        Self {
            query: query.into(),
            y_true,
            y_score,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.y_true.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.y_true.is_empty()
    }

    pub fn relevance_sum(&self) -> f64 {
        self.y_true.iter().sum()
    }

    /// At least two rows and some relevant row
    pub fn is_evaluable(&self) -> bool {
        self.len() >= 2 && self.relevance_sum() > 0.0
    }

    fn check_lengths(&self) -> Result<()> {
        if self.y_true.len() != self.y_score.len() {
            return Err(Error::MismatchedLengths {
                query: self.query.clone(),
                expected: self.y_true.len(),
                actual: self.y_score.len(),
            });
        }
        Ok(())
    }
}

/// Collect true labels and predicted scores per query, sorted by query
///
/// Rows without a query belong to no group and are skipped. Missing cells
/// are left out of their list, so a group with a missing label or
/// prediction ends up with mismatched lengths.
pub fn group_by_query(
    dataset: &Dataset,
    query_col: &str,
    target_col: &str,
    prediction_col: &str,
) -> Result<Vec<QueryGroup>> {
    let queries = dataset.categorical(query_col)?;
    let y_true = dataset.numeric(target_col)?;
    let y_score = dataset.numeric(prediction_col)?;

    let mut groups: BTreeMap<&str, QueryGroup> = BTreeMap::new();
    let mut unassigned = 0usize;
    for (row, query) in queries.iter().enumerate() {
        let Some(query) = query.as_deref() else {
            unassigned += 1;
            continue;
        };
        let group = groups
            .entry(query)
            .or_insert_with(|| QueryGroup::new(query, Vec::new(), Vec::new()));
        if let Some(label) = y_true[row].filter(|v| !v.is_nan()) {
            group.y_true.push(label);
        }
        if let Some(score) = y_score[row].filter(|v| !v.is_nan()) {
            group.y_score.push(score);
        }
    }
    if unassigned > 0 {
        debug!(
            "Skipped {} rows with a missing query in '{}'",
            unassigned, query_col
        );
    }
    Ok(groups.into_values().collect())
}

/// Mean of `metric` over the evaluable groups
///
/// Every group is length-checked first: a single mismatch fails the whole
/// call.
pub fn evaluate_groups(groups: &[QueryGroup], metric_name: &str, metric: &MetricFn) -> Result<f64> {
    for group in groups {
        group.check_lengths()?;
    }

    let mut total = 0.0;
    let mut evaluated = 0usize;
    for group in groups {
        if !group.is_evaluable() {
            debug!(
                "Skipping query '{}' ({} rows, relevance {})",
                group.query,
                group.len(),
                group.relevance_sum()
            );
            continue;
        }
        total += metric(group.y_true.as_slice(), group.y_score.as_slice())?;
        evaluated += 1;
    }

    if evaluated == 0 {
        return Err(Error::EmptyEvaluation(metric_name.to_string()));
    }
    if evaluated < groups.len() {
        warn!(
            "{} of {} queries skipped for '{}'",
            groups.len() - evaluated,
            groups.len(),
            metric_name
        );
    }
    Ok(total / evaluated as f64)
}

/// Mean of a ranking metric over parallel per-query label and score lists
pub fn calculate_query_ranking_metric(
    registry: &MetricRegistry,
    y_true: &[Vec<f64>],
    y_score: &[Vec<f64>],
    metric_name: &str,
) -> Result<f64> {
    let metric = registry.get(metric_name)?;
    if y_true.len() != y_score.len() {
        return Err(Error::InvalidInput(format!(
            "{} label lists but {} score lists",
            y_true.len(),
            y_score.len()
        )));
    }
    let groups: Vec<QueryGroup> = y_true
        .iter()
        .zip(y_score)
        .enumerate()
        .map(|(i, (t, s))| QueryGroup::new(i.to_string(), t.clone(), s.clone()))
        .collect();
    evaluate_groups(&groups, metric_name, metric)
}

/// Ranking metrics of a scored dataset, grouped by the schema's query
/// column
pub fn get_ranking_metrics<S: AsRef<str>>(
    registry: &MetricRegistry,
    dataset: &Dataset,
    schema: &Schema,
    prediction_col: &str,
    metric_names: &[S],
) -> Result<BTreeMap<String, f64>> {
    let metrics = registry.resolve(metric_names)?;
    if metrics.is_empty() {
        return Ok(BTreeMap::new());
    }
    let groups = group_by_query(dataset, schema.query_col(), schema.target(), prediction_col)?;
    info!(
        "Evaluating {} ranking metrics over {} queries",
        metrics.len(),
        groups.len()
    );

    metrics
        .into_iter()
        .map(|(name, metric)| {
            let value = evaluate_groups(&groups, &name, metric)?;
            Ok((name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankprep_schema::ImputeStrategy;
    use serde_json::json;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn schema() -> Schema {
        Schema::builder("interacted", "query_id")
            .numerical("price", ImputeStrategy::Mean)
            .build()
            .unwrap()
    }

    fn scored() -> Dataset {
        Dataset::from_records(&[
            json!({"query_id": "query1", "interacted": 1, "prediction": 0.9}),
            json!({"query_id": "query1", "interacted": 0, "prediction": 0.2}),
            json!({"query_id": "query1", "interacted": 0, "prediction": 0.4}),
            json!({"query_id": "query2", "interacted": 0, "prediction": 0.7}),
            json!({"query_id": "query2", "interacted": 1, "prediction": 0.6}),
            json!({"query_id": "query2", "interacted": 0, "prediction": 0.1}),
            json!({"query_id": "query3", "interacted": 1, "prediction": 0.3}),
            json!({"query_id": "query4", "interacted": 0, "prediction": 0.8}),
            json!({"query_id": "query4", "interacted": 0, "prediction": 0.5}),
        ])
        .unwrap()
    }

    #[test]
    fn test_calculate_query_ranking_metric() {
        let registry = MetricRegistry::default();
        let y_true = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0, 0.0]];
        let y_score = vec![vec![0.8, 0.6, 0.7], vec![0.9, 0.95, 0.3, 0.4]];
        let ndcg = calculate_query_ranking_metric(&registry, &y_true, &y_score, "ndcg_score").unwrap();
        assert_eq!(ndcg, 1.0);
    }

    #[test]
    fn test_group_by_query() {
        let groups = group_by_query(&scored(), "query_id", "interacted", "prediction").unwrap();
        let queries: Vec<&str> = groups.iter().map(|g| g.query.as_str()).collect();
        assert_eq!(queries, vec!["query1", "query2", "query3", "query4"]);
        assert_eq!(groups[1].y_true, vec![0.0, 1.0, 0.0]);
        assert_eq!(groups[1].y_score, vec![0.7, 0.6, 0.1]);
        assert!(!groups[2].is_evaluable());
        assert!(!groups[3].is_evaluable());
    }

    #[test]
    fn test_get_ranking_metrics_skips_degenerate_queries() {
        let registry = MetricRegistry::default();
        let metrics =
            get_ranking_metrics(&registry, &scored(), &schema(), "prediction", &["ndcg_score"])
                .unwrap();
        // query1 ranks its click first, query2 second; query3 and query4 are skipped
        assert_close(metrics["ndcg_score"], (1.0 + 1.0 / 3f64.log2()) / 2.0);
        assert_close(metrics["ndcg_score"], 0.8154648767857288);
    }

    #[test]
    fn test_rows_without_query_are_skipped() {
        let mut records = scored().to_records();
        records.push(json!({"query_id": null, "interacted": 1, "prediction": 0.05}));
        let data = Dataset::from_records(&records).unwrap();

        let groups = group_by_query(&data, "query_id", "interacted", "prediction").unwrap();
        assert_eq!(groups.len(), 4);
        assert_eq!(groups.iter().map(QueryGroup::len).sum::<usize>(), 9);

        let metrics =
            get_ranking_metrics(&MetricRegistry::default(), &data, &schema(), "prediction", &["ndcg_score"])
                .unwrap();
        assert_close(metrics["ndcg_score"], 0.8154648767857288);
    }

    #[test]
    fn test_mismatched_lengths_abort_the_call() {
        let registry = MetricRegistry::default();
        let y_true = vec![vec![1.0, 0.0], vec![0.0, 1.0, 0.0]];
        let y_score = vec![vec![0.8, 0.6], vec![0.9, 0.95]];
        let result = calculate_query_ranking_metric(&registry, &y_true, &y_score, "ndcg_score");
        assert!(matches!(
            result,
            Err(Error::MismatchedLengths { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_missing_prediction_is_a_length_mismatch() {
        let mut data = scored();
        let mut predictions = data.numeric("prediction").unwrap().to_vec();
        predictions[4] = None;
        data.insert_column("prediction", rankprep_core::ColumnData::Numeric(predictions))
            .unwrap();
        let result =
            get_ranking_metrics(&MetricRegistry::default(), &data, &schema(), "prediction", &["ndcg_score"]);
        assert!(matches!(
            result,
            Err(Error::MismatchedLengths { ref query, .. }) if query == "query2"
        ));
    }

    #[test]
    fn test_no_evaluable_query() {
        let registry = MetricRegistry::default();
        let y_true = vec![vec![1.0], vec![0.0, 0.0]];
        let y_score = vec![vec![0.8], vec![0.9, 0.95]];
        let result = calculate_query_ranking_metric(&registry, &y_true, &y_score, "ndcg_score");
        assert!(matches!(result, Err(Error::EmptyEvaluation(_))));
    }

    #[test]
    fn test_unknown_metric_name() {
        let registry = MetricRegistry::default();
        let result =
            get_ranking_metrics(&registry, &scored(), &schema(), "prediction", &["nonexistent_metric"]);
        assert!(matches!(result, Err(Error::UnknownMetric(_))));
    }
}
