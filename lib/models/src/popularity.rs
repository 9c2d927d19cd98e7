//! Popularity baseline
//!
//! Unpersonalised model: the probability of an interaction with an item is
//! the mean target observed for that item during training.

use crate::model::{check_target, ProbabilisticClassifier};
use ahash::AHashMap;
use rankprep_core::{Dataset, Error, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct PopularityBaseline {
    target_col: String,
    item_id_col: String,
    default_val: Option<f64>,
    lookup: Option<AHashMap<String, f64>>,
    fallback: f64,
}

impl PopularityBaseline {
    /// `default_val` scores unseen items; without it they get the global
    /// target mean
    pub fn new(
        target_col: impl Into<String>,
        item_id_col: impl Into<String>,
        default_val: Option<f64>,
    ) -> Self {
        Self {
            target_col: target_col.into(),
            item_id_col: item_id_col.into(),
            default_val,
            lookup: None,
            fallback: 0.0,
        }
    }

    #[inline]
    pub fn target_col(&self) -> &str {
        &self.target_col
    }

    #[inline]
    pub fn item_id_col(&self) -> &str {
        &self.item_id_col
    }

    /// Train on a dataset holding the target column itself
    pub fn fit_dataset(&mut self, data: &Dataset) -> Result<()> {
        let target = data
            .numeric(&self.target_col)?
            .iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "missing target '{}' at row {}",
                        self.target_col, row
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        self.fit(data, &target)
    }

    fn fitted_lookup(&self) -> Result<&AHashMap<String, f64>> {
        self.lookup
            .as_ref()
            .ok_or_else(|| Error::NotFitted("popularity baseline".to_string()))
    }

    /// Score of one item
    pub fn score(&self, item_id: &str) -> Result<f64> {
        let lookup = self.fitted_lookup()?;
        Ok(lookup.get(item_id).copied().unwrap_or(self.fallback))
    }
}

impl ProbabilisticClassifier for PopularityBaseline {
    fn name(&self) -> &'static str {
        "popularity_baseline"
    }

    fn fit(&mut self, data: &Dataset, target: &[f64]) -> Result<()> {
        check_target(data, target)?;
        let items = data.categorical(&self.item_id_col)?;

        let mut totals: AHashMap<String, (f64, usize)> = AHashMap::new();
        for (item, &t) in items.iter().zip(target) {
            // rows without an item id only count towards the global mean
            if let Some(item) = item {
                let entry = totals.entry(item.clone()).or_insert((0.0, 0));
                entry.0 += t;
                entry.1 += 1;
            }
        }

        let global = target.iter().sum::<f64>() / target.len() as f64;
        self.fallback = self.default_val.unwrap_or(global);
        self.lookup = Some(
            totals
                .into_iter()
                .map(|(item, (sum, count))| (item, sum / count as f64))
                .collect(),
        );
        info!(
            "Fitted popularity baseline over {} items, fallback {}",
            self.lookup.as_ref().map_or(0, |l| l.len()),
            self.fallback
        );
        Ok(())
    }

    fn predict_proba(&self, data: &Dataset) -> Result<Vec<[f64; 2]>> {
        let lookup = self.fitted_lookup()?;
        let items = data.categorical(&self.item_id_col)?;
        Ok(items
            .iter()
            .map(|item| {
                let p = item
                    .as_deref()
                    .and_then(|item| lookup.get(item).copied())
                    .unwrap_or(self.fallback);
                [1.0 - p, p]
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.lookup.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn training() -> Dataset {
        Dataset::from_records(&[
            json!({"product_id": "prod100", "interacted": 1}),
            json!({"product_id": "prod100", "interacted": 0}),
            json!({"product_id": "prod101", "interacted": 0}),
            json!({"product_id": "prod102", "interacted": 1}),
        ])
        .unwrap()
    }

    #[test]
    fn test_item_mean_and_global_fallback() {
        let mut model = PopularityBaseline::new("interacted", "product_id", None);
        model.fit_dataset(&training()).unwrap();

        let data = Dataset::from_records(&[
            json!({"product_id": "prod100"}),
            json!({"product_id": "prod102"}),
            json!({"product_id": "prod200"}),
        ])
        .unwrap();
        let proba = model.predict_proba(&data).unwrap();
        assert_eq!(proba[0], [0.5, 0.5]);
        assert_eq!(proba[1], [0.0, 1.0]);
        assert_eq!(proba[2], [0.5, 0.5]);
    }

    #[test]
    fn test_default_value_for_unseen_items() {
        let mut model = PopularityBaseline::new("interacted", "product_id", Some(0.1));
        model.fit_dataset(&training()).unwrap();
        assert_eq!(model.score("prod200").unwrap(), 0.1);
        assert_eq!(model.score("prod101").unwrap(), 0.0);
    }

    #[test]
    fn test_predict_before_fit() {
        let model = PopularityBaseline::new("interacted", "product_id", None);
        assert!(!model.is_fitted());
        assert!(matches!(
            model.predict_proba(&training()),
            Err(Error::NotFitted(_))
        ));
    }
}
