//! Pointwise metrics over the whole scored dataset

use crate::registry::MetricRegistry;
use rankprep_core::{Dataset, Error, Result};
use rankprep_schema::Schema;
use std::collections::BTreeMap;
use tracing::info;

fn complete_column(dataset: &Dataset, name: &str) -> Result<Vec<f64>> {
    dataset
        .numeric(name)?
        .iter()
        .enumerate()
        .map(|(row, v)| {
            v.filter(|x| !x.is_nan()).ok_or_else(|| {
                Error::InvalidInput(format!("missing value in '{}' at row {}", name, row))
            })
        })
        .collect()
}

/// Evaluate every named metric on the target and prediction columns
pub fn get_pointwise_metrics<S: AsRef<str>>(
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
    let y_true = complete_column(dataset, schema.target())?;
    let y_score = complete_column(dataset, prediction_col)?;
    info!(
        "Evaluating {} pointwise metrics over {} rows",
        metrics.len(),
        y_true.len()
    );

    metrics
        .into_iter()
        .map(|(name, metric)| {
            let value = metric(y_true.as_slice(), y_score.as_slice())?;
            Ok((name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankprep_schema::ImputeStrategy;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::builder("clicked", "query_id")
            .numerical("price", ImputeStrategy::Mean)
            .build()
            .unwrap()
    }

    fn scored() -> Dataset {
        Dataset::from_records(&[
            json!({"query_id": "a", "clicked": 1, "prediction": 0.9}),
            json!({"query_id": "a", "clicked": 0, "prediction": 0.1}),
            json!({"query_id": "b", "clicked": 1, "prediction": 0.4}),
            json!({"query_id": "b", "clicked": 0, "prediction": 0.6}),
        ])
        .unwrap()
    }

    #[test]
    fn test_get_pointwise_metrics() {
        let metrics = get_pointwise_metrics(
            &MetricRegistry::default(),
            &scored(),
            &schema(),
            "prediction",
            &["roc_auc_score", "log_loss"],
        )
        .unwrap();

        assert_eq!(metrics.len(), 2);
        assert!((metrics["roc_auc_score"] - 0.75).abs() < 1e-12);
        assert!((metrics["log_loss"] - 0.510825623765990).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_metric() {
        let result = get_pointwise_metrics(
            &MetricRegistry::default(),
            &scored(),
            &schema(),
            "prediction",
            &["nonexistent_metric"],
        );
        assert!(matches!(result, Err(Error::UnknownMetric(_))));
    }

    #[test]
    fn test_missing_prediction_column() {
        let result = get_pointwise_metrics(
            &MetricRegistry::default(),
            &scored(),
            &schema(),
            "score",
            &["log_loss"],
        );
        assert!(matches!(result, Err(Error::MissingColumn(_))));
    }
}
