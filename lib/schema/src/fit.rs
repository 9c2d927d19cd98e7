//! Statistics fitter
//!
//! Learns, from a reference dataset, the three artifacts the preprocessing
//! pipeline needs: imputation values, normalization statistics and
//! categorical vocabularies. Fitting is a pure function of the schema and
//! the dataset, so refitting on the same data gives identical results.

use crate::feature::{FeatureDescriptor, FeatureKind, ImputeStrategy, ImputeValue};
use crate::fitted::FittedSchema;
use crate::schema::Schema;
use rankprep_core::{render_number, stats, ColumnData, Dataset, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Mean and sample standard deviation of a numerical feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormStats {
    pub mean: f64,
    pub std: f64,
}

impl NormStats {
    /// Standard deviation to divide by; zero is replaced by `epsilon`
    #[inline]
    pub fn effective_std(&self, epsilon: f64) -> f64 {
        if self.std == 0.0 {
            epsilon
        } else {
            self.std
        }
    }

    /// Z-score of `value`
    #[inline]
    pub fn normalize(&self, value: f64, epsilon: f64) -> f64 {
        (value - self.mean) / self.effective_std(epsilon)
    }
}

/// Computes fitted statistics for a schema
#[derive(Debug, Clone, Copy)]
pub struct StatisticsFitter<'a> {
    schema: &'a Schema,
}

impl<'a> StatisticsFitter<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Run all fitting steps in order and assemble the fitted schema
    pub fn fit(&self, reference: &Dataset) -> Result<FittedSchema> {
        info!(
            "Fitting schema on {} rows ({} categorical, {} numerical features)",
            reference.num_rows(),
            self.schema.categorical_features().len(),
            self.schema.numerical_features().len()
        );

        let imputations = self.imputations(reference)?;
        debug!("Imputations: {:?}", imputations);

        let norm_stats = self.norm_stats(reference)?;
        debug!("Norm stats: {:?}", norm_stats);

        let vocabs = self.vocabs(reference)?;
        debug!("Vocabs: {:?}", vocabs);

        FittedSchema::new(self.schema.clone(), imputations, norm_stats, vocabs)
    }

    /// Imputation value per feature
    ///
    /// Fixed values are taken as configured; statistical strategies
    /// aggregate the non-missing reference values.
    pub fn imputations(&self, reference: &Dataset) -> Result<BTreeMap<String, ImputeValue>> {
        let mut imputations = BTreeMap::new();
        for feature in self.schema.all_features() {
            let value = match feature.impute_strategy() {
                ImputeStrategy::Value(value) => value.clone(),
                strategy => aggregate(reference, feature, strategy)?,
            };
            imputations.insert(feature.name().to_string(), value);
        }
        Ok(imputations)
    }

    /// Mean and standard deviation per numerical feature
    pub fn norm_stats(&self, reference: &Dataset) -> Result<BTreeMap<String, NormStats>> {
        let mut norm_stats = BTreeMap::new();
        for feature in self.schema.numerical_features() {
            let values = reference.numeric(feature.name())?;
            let (mean, std) = match (stats::mean(values), stats::std_dev(values)) {
                (Some(mean), Some(std)) => (mean, std),
                _ => return Err(no_values(feature, "normalization statistics")),
            };
            norm_stats.insert(feature.name().to_string(), NormStats { mean, std });
        }
        Ok(norm_stats)
    }

    /// Sorted distinct non-missing labels per categorical feature
    ///
    /// Numeric-coded columns are ordered by value before rendering, so codes
    /// `2` and `10` give `["2", "10"]`.
    pub fn vocabs(&self, reference: &Dataset) -> Result<BTreeMap<String, Vec<String>>> {
        let mut vocabs = BTreeMap::new();
        for feature in self.schema.categorical_features() {
            let vocab = match &reference.column(feature.name())?.data {
                ColumnData::Numeric(values) => stats::distinct_values(values)
                    .into_iter()
                    .map(render_number)
                    .collect(),
                ColumnData::Categorical(labels) => stats::distinct_labels(labels),
            };
            vocabs.insert(feature.name().to_string(), vocab);
        }
        Ok(vocabs)
    }
}

fn aggregate(
    reference: &Dataset,
    feature: &FeatureDescriptor,
    strategy: &ImputeStrategy,
) -> Result<ImputeValue> {
    match feature.kind() {
        FeatureKind::Categorical => {
            let mode = match &reference.column(feature.name())?.data {
                ColumnData::Numeric(values) => stats::mode(values).map(render_number),
                ColumnData::Categorical(labels) => stats::mode_label(labels),
            };
            mode.map(ImputeValue::Label)
                .ok_or_else(|| no_values(feature, "an imputation value"))
        }
        FeatureKind::Numerical => {
            let values = reference.numeric(feature.name())?;
            let aggregate = match strategy {
                ImputeStrategy::Mean => stats::mean(values),
                ImputeStrategy::Median => stats::median(values),
                ImputeStrategy::Mode => stats::mode(values),
                ImputeStrategy::Min => stats::min(values),
                ImputeStrategy::Max => stats::max(values),
                ImputeStrategy::Value(value) => value.as_number(),
            };
            aggregate
                .map(ImputeValue::Number)
                .ok_or_else(|| no_values(feature, "an imputation value"))
        }
    }
}

fn no_values(feature: &FeatureDescriptor, what: &str) -> Error {
    Error::InvalidInput(format!(
        "cannot compute {} for '{}': reference column has no non-missing values",
        what,
        feature.name()
    ))
}
