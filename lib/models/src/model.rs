//! Classifier interface

use rankprep_core::{ColumnData, Dataset, Error, Result};
use std::fmt;

/// Binary classifier producing `[p_negative, p_positive]` per row
pub trait ProbabilisticClassifier: fmt::Debug + Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Train on `data` with one target value per row
    fn fit(&mut self, data: &Dataset, target: &[f64]) -> Result<()>;

    /// Class probabilities, one pair per row of `data`
    fn predict_proba(&self, data: &Dataset) -> Result<Vec<[f64; 2]>>;

    fn is_fitted(&self) -> bool;
}

pub(crate) fn check_target(data: &Dataset, target: &[f64]) -> Result<()> {
    if data.num_rows() != target.len() {
        return Err(Error::InvalidInput(format!(
            "{} rows but {} target values",
            data.num_rows(),
            target.len()
        )));
    }
    if target.is_empty() {
        return Err(Error::InvalidInput("cannot fit on an empty dataset".to_string()));
    }
    if target.iter().any(|t| t.is_nan()) {
        return Err(Error::InvalidInput("NaN in target".to_string()));
    }
    Ok(())
}

/// Append the positive-class probability of every row as `prediction_col`
pub fn score_dataset(
    dataset: &Dataset,
    model: &dyn ProbabilisticClassifier,
    prediction_col: &str,
) -> Result<Dataset> {
    let scores = model
        .predict_proba(dataset)?
        .into_iter()
        .map(|[_, positive]| Some(positive))
        .collect();
    dataset
        .clone()
        .with_column(prediction_col, ColumnData::Numeric(scores))
}
