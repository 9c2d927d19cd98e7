//! Schema definitions
//!
//! A [`Schema`] names the target column, the query (grouping) column and
//! the categorical and numerical features of a search-ranking dataset.
//! It holds no learned state: fitting it against a reference dataset
//! produces a separate [`FittedSchema`].

use crate::config::SchemaConfig;
use crate::feature::{FeatureDescriptor, FeatureKind, ImputeStrategy};
use crate::fit::StatisticsFitter;
use crate::fitted::FittedSchema;
use rankprep_core::{Dataset, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Unfitted schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaData")]
pub struct Schema {
    target: String,
    query_col: String,
    categorical_features: Vec<FeatureDescriptor>,
    numerical_features: Vec<FeatureDescriptor>,
}

#[derive(Deserialize)]
struct SchemaData {
    target: String,
    query_col: String,
    #[serde(default)]
    categorical_features: Vec<FeatureDescriptor>,
    #[serde(default)]
    numerical_features: Vec<FeatureDescriptor>,
}

impl TryFrom<SchemaData> for Schema {
    type Error = Error;

    fn try_from(data: SchemaData) -> Result<Self> {
        Schema::new(
            data.target,
            data.query_col,
            data.categorical_features,
            data.numerical_features,
        )
    }
}

impl Schema {
    /// Create a schema from descriptors
    ///
    /// Feature names must be unique across both kinds and must not collide
    /// with the target or query column.
    pub fn new(
        target: impl Into<String>,
        query_col: impl Into<String>,
        categorical_features: Vec<FeatureDescriptor>,
        numerical_features: Vec<FeatureDescriptor>,
    ) -> Result<Self> {
        let schema = Self {
            target: target.into(),
            query_col: query_col.into(),
            categorical_features,
            numerical_features,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Build a schema from its declarative configuration
    pub fn build(config: &SchemaConfig) -> Result<Self> {
        info!("Creating schema from configuration");
        Self::new(
            config.require_target()?,
            config.require_query_col()?,
            config.descriptors(FeatureKind::Categorical)?,
            config.descriptors(FeatureKind::Numerical)?,
        )
    }

    /// Start a schema programmatically
    pub fn builder(target: impl Into<String>, query_col: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(target, query_col)
    }

    fn validate(&self) -> Result<()> {
        if self.target.is_empty() {
            return Err(Error::Configuration("missing required key 'target'".to_string()));
        }
        if self.query_col.is_empty() {
            return Err(Error::Configuration("missing required key 'query_col'".to_string()));
        }
        if self.target == self.query_col {
            return Err(Error::Configuration(format!(
                "target and query column are both '{}'",
                self.target
            )));
        }

        for feature in &self.categorical_features {
            if feature.kind() != FeatureKind::Categorical {
                return Err(Error::Configuration(format!(
                    "feature '{}' is listed as categorical but is {:?}",
                    feature.name(),
                    feature.kind()
                )));
            }
        }
        for feature in &self.numerical_features {
            if feature.kind() != FeatureKind::Numerical {
                return Err(Error::Configuration(format!(
                    "feature '{}' is listed as numerical but is {:?}",
                    feature.name(),
                    feature.kind()
                )));
            }
        }

        let mut seen = HashSet::new();
        for feature in self.all_features() {
            let name = feature.name();
            if name == self.target || name == self.query_col {
                return Err(Error::Configuration(format!(
                    "feature '{}' collides with the target or query column",
                    name
                )));
            }
            if !seen.insert(name) {
                return Err(Error::Configuration(format!(
                    "feature '{}' is declared more than once",
                    name
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[inline]
    pub fn query_col(&self) -> &str {
        &self.query_col
    }

    #[inline]
    pub fn categorical_features(&self) -> &[FeatureDescriptor] {
        &self.categorical_features
    }

    #[inline]
    pub fn numerical_features(&self) -> &[FeatureDescriptor] {
        &self.numerical_features
    }

    /// Categorical features followed by numerical features
    pub fn all_features(&self) -> impl Iterator<Item = &FeatureDescriptor> {
        self.categorical_features
            .iter()
            .chain(self.numerical_features.iter())
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.all_features().map(|f| f.name()).collect()
    }

    /// Feature columns plus target and query column
    pub fn modeled_columns(&self) -> Vec<&str> {
        let mut columns = self.feature_names();
        columns.push(&self.target);
        columns.push(&self.query_col);
        columns
    }

    /// Learn imputations, normalization statistics and vocabularies
    pub fn fit(&self, reference: &Dataset) -> Result<FittedSchema> {
        StatisticsFitter::new(self).fit(reference)
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    target: String,
    query_col: String,
    categorical: Vec<(String, ImputeStrategy)>,
    numerical: Vec<(String, ImputeStrategy)>,
}

impl SchemaBuilder {
    pub fn new(target: impl Into<String>, query_col: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            query_col: query_col.into(),
            categorical: Vec::new(),
            numerical: Vec::new(),
        }
    }

    pub fn categorical(mut self, name: impl Into<String>, impute: ImputeStrategy) -> Self {
        self.categorical.push((name.into(), impute));
        self
    }

    pub fn numerical(mut self, name: impl Into<String>, impute: ImputeStrategy) -> Self {
        self.numerical.push((name.into(), impute));
        self
    }

    pub fn build(self) -> Result<Schema> {
        let categorical = self
            .categorical
            .into_iter()
            .map(|(name, impute)| FeatureDescriptor::categorical(name, impute))
            .collect::<Result<Vec<_>>>()?;
        let numerical = self
            .numerical
            .into_iter()
            .map(|(name, impute)| FeatureDescriptor::numerical(name, impute))
            .collect::<Result<Vec<_>>>()?;
        Schema::new(self.target, self.query_col, categorical, numerical)
    }
}
