//! Metric registry
//!
//! Maps metric names to metric functions. Names are resolved once, before
//! any evaluation work starts, so a typo fails fast with
//! [`Error::UnknownMetric`].

use crate::metrics;
use rankprep_core::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A metric: true labels and predicted scores of equal length to a scalar
pub type MetricFn = Arc<dyn Fn(&[f64], &[f64]) -> Result<f64> + Send + Sync>;

/// Named metric functions
#[derive(Clone)]
pub struct MetricRegistry {
    metrics: BTreeMap<String, MetricFn>,
}

impl fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("metrics", &self.names())
            .finish()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl MetricRegistry {
    /// Registry without any metric
    pub fn empty() -> Self {
        Self {
            metrics: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in metrics
    pub fn with_defaults() -> Self {
        let builtin: [(&str, fn(&[f64], &[f64]) -> Result<f64>); 7] = [
            ("roc_auc_score", metrics::roc_auc_score),
            ("log_loss", metrics::log_loss),
            ("average_precision_score", metrics::average_precision_score),
            ("brier_score_loss", metrics::brier_score_loss),
            ("ndcg_score", metrics::ndcg_score),
            ("dcg_score", metrics::dcg_score),
            ("reciprocal_rank", metrics::reciprocal_rank),
        ];
        let metrics = builtin
            .into_iter()
            .map(|(name, f)| (name.to_string(), Arc::new(f) as MetricFn))
            .collect();
        Self { metrics }
    }

    /// Register a metric under a new name
    pub fn register<F>(&mut self, name: impl Into<String>, metric: F) -> Result<()>
    where
        F: Fn(&[f64], &[f64]) -> Result<f64> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Configuration("metric name must not be empty".to_string()));
        }
        if self.metrics.contains_key(&name) {
            return Err(Error::DuplicateMetric(name));
        }
        self.metrics.insert(name, Arc::new(metric));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&MetricFn> {
        self.metrics
            .get(name)
            .ok_or_else(|| Error::UnknownMetric(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.metrics.keys().map(String::as_str).collect()
    }

    /// Resolve every name up front
    pub fn resolve<'a, S: AsRef<str>>(&'a self, names: &[S]) -> Result<Vec<(String, &'a MetricFn)>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name).map(|metric| (name.to_string(), metric))
            })
            .collect()
    }

    pub fn evaluate(&self, name: &str, y_true: &[f64], y_score: &[f64]) -> Result<f64> {
        (self.get(name)?)(y_true, y_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let registry = MetricRegistry::default();
        for name in ["roc_auc_score", "log_loss", "ndcg_score", "reciprocal_rank"] {
            assert!(registry.contains(name), "{} missing", name);
        }
        let ndcg = registry
            .evaluate("ndcg_score", &[1.0, 0.0, 0.0], &[0.8, 0.6, 0.7])
            .unwrap();
        assert_eq!(ndcg, 1.0);
    }

    #[test]
    fn test_unknown_metric() {
        let registry = MetricRegistry::default();
        assert!(matches!(
            registry.evaluate("nonexistent_metric", &[1.0], &[1.0]),
            Err(Error::UnknownMetric(name)) if name == "nonexistent_metric"
        ));
        assert!(registry.resolve(&["log_loss", "nope"]).is_err());
    }

    #[test]
    fn test_register_custom_metric() {
        let mut registry = MetricRegistry::empty();
        registry
            .register("top_score", |_y_true: &[f64], y_score: &[f64]| {
                Ok(y_score.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
            })
            .unwrap();
        assert_eq!(registry.names(), vec!["top_score"]);
        assert_eq!(registry.evaluate("top_score", &[0.0, 1.0], &[0.2, 0.7]).unwrap(), 0.7);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = MetricRegistry::default();
        let result = registry.register("log_loss", metrics::brier_score_loss);
        assert!(matches!(result, Err(Error::DuplicateMetric(_))));
        assert!(registry.register("  ", metrics::brier_score_loss).is_err());
    }
}
