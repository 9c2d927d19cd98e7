//! Preprocessor
//!
//! Applies every schema-driven transform, in a fixed order, to datasets
//! sharing the reference dataset's columns.

use crate::encoder::OneHotEncoder;
use crate::impute::impute;
use crate::normalize::{normalize_numerical_features, DEFAULT_EPSILON};
use crate::oov::map_oov_categories;
use rankprep_core::{ColumnData, Dataset, Error, Result};
use rankprep_schema::{FittedSchema, Schema};
use std::sync::Arc;
use tracing::info;

/// Options of [`Preprocessor::apply`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessorOptions {
    /// Replacement for a zero standard deviation
    pub epsilon: f64,
    /// Keep only features, target and query column
    pub drop_unmodeled_columns: bool,
}

impl Default for PreprocessorOptions {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            drop_unmodeled_columns: true,
        }
    }
}

impl PreprocessorOptions {
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn drop_unmodeled_columns(mut self, drop: bool) -> Self {
        self.drop_unmodeled_columns = drop;
        self
    }
}

/// Stateful transform built from a fitted schema
///
/// The encoder is frozen at construction; `apply` never mutates the
/// preprocessor or its input and can be called from several threads.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    schema: Arc<FittedSchema>,
    encoder: OneHotEncoder,
    options: PreprocessorOptions,
}

impl Preprocessor {
    /// Create a preprocessor for an already fitted schema
    pub fn new(schema: Arc<FittedSchema>) -> Result<Self> {
        Self::with_options(schema, PreprocessorOptions::default())
    }

    pub fn with_options(schema: Arc<FittedSchema>, options: PreprocessorOptions) -> Result<Self> {
        if !(options.epsilon > 0.0 && options.epsilon.is_finite()) {
            return Err(Error::Configuration(format!(
                "epsilon must be a positive finite number, got {}",
                options.epsilon
            )));
        }
        let encoder = OneHotEncoder::from_schema(&schema)?;
        Ok(Self {
            schema,
            encoder,
            options,
        })
    }

    /// Fit `schema` on `reference` and build a preprocessor from it
    pub fn fit(reference: &Dataset, schema: &Schema) -> Result<Self> {
        Self::new(Arc::new(schema.fit(reference)?))
    }

    #[inline]
    pub fn schema(&self) -> &Arc<FittedSchema> {
        &self.schema
    }

    #[inline]
    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    #[inline]
    pub fn options(&self) -> &PreprocessorOptions {
        &self.options
    }

    /// Transform with the configured options
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        self.apply_with(dataset, self.options.drop_unmodeled_columns)
    }

    /// Transform a dataset
    ///
    /// Steps, in order: restrict columns, coerce categorical features to
    /// labels, impute, map unknown categories to OOV, normalize, one-hot
    /// encode. Numerical features keep their position; indicator columns
    /// are appended in [`FittedSchema::expanded_feature_columns`] order.
    pub fn apply_with(&self, dataset: &Dataset, drop_unmodeled_columns: bool) -> Result<Dataset> {
        let schema = self.schema.as_ref();
        for name in schema.schema().feature_names() {
            if !dataset.has_column(name) {
                return Err(Error::MissingColumn(name.to_string()));
            }
        }

        let mut df = if drop_unmodeled_columns {
            self.restrict(dataset)?
        } else {
            dataset.clone()
        };

        for feature in schema.categorical_features() {
            let labels = df.categorical(feature.name())?.into_owned();
            df.insert_column(feature.name(), ColumnData::Categorical(labels))?;
        }

        let df = impute(&df, schema.imputations())?;
        let df = map_oov_categories(&df, schema)?;
        let df = normalize_numerical_features(&df, schema.norm_stats(), self.options.epsilon)?;
        let df = self.encoder.transform(&df)?;

        info!(
            "Preprocessed {} rows into {} columns",
            df.num_rows(),
            df.num_columns()
        );
        Ok(df)
    }

    /// Features, then target and query column when present
    ///
    /// Inference data may come without a target.
    fn restrict(&self, dataset: &Dataset) -> Result<Dataset> {
        let columns: Vec<&str> = self
            .schema
            .schema()
            .modeled_columns()
            .into_iter()
            .filter(|c| dataset.has_column(c))
            .collect();
        dataset.select(&columns)
    }
}
