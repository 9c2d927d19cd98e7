//! Fitted schema
//!
//! A [`FittedSchema`] is a [`Schema`] together with the statistics learned
//! from a reference dataset. It only exists once fitting succeeded, so the
//! operations needing learned statistics cannot be called on an unfitted
//! schema. It is read-only and meant to be shared (e.g. behind an `Arc`)
//! by every consumer of one model version.

use crate::feature::{FeatureDescriptor, ImputeValue};
use crate::fit::NormStats;
use crate::schema::Schema;
use ahash::AHashSet;
use rankprep_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category every unknown label is mapped to
pub const OOV_TOKEN: &str = "<OOV>";

/// Name of the indicator column for `category` of `feature`
pub fn one_hot_column(feature: &str, category: &str) -> String {
    format!("{}_{}", feature, category)
}

/// Schema plus learned imputations, normalization statistics and vocabularies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FittedSchemaData")]
pub struct FittedSchema {
    schema: Schema,
    imputations: BTreeMap<String, ImputeValue>,
    norm_stats: BTreeMap<String, NormStats>,
    vocabs: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct FittedSchemaData {
    schema: Schema,
    imputations: BTreeMap<String, ImputeValue>,
    norm_stats: BTreeMap<String, NormStats>,
    vocabs: BTreeMap<String, Vec<String>>,
}

impl TryFrom<FittedSchemaData> for FittedSchema {
    type Error = Error;

    fn try_from(data: FittedSchemaData) -> Result<Self> {
        FittedSchema::new(data.schema, data.imputations, data.norm_stats, data.vocabs)
    }
}

impl FittedSchema {
    /// Assemble a fitted schema, checking every feature has its statistics
    pub fn new(
        schema: Schema,
        imputations: BTreeMap<String, ImputeValue>,
        norm_stats: BTreeMap<String, NormStats>,
        vocabs: BTreeMap<String, Vec<String>>,
    ) -> Result<Self> {
        let fitted = Self {
            schema,
            imputations,
            norm_stats,
            vocabs,
        };
        fitted.validate()?;
        Ok(fitted)
    }

    fn validate(&self) -> Result<()> {
        for feature in self.schema.all_features() {
            if !self.imputations.contains_key(feature.name()) {
                return Err(Error::NotFitted(format!(
                    "imputation for '{}'",
                    feature.name()
                )));
            }
        }

        for feature in self.schema.numerical_features() {
            let stats = self.norm_stats.get(feature.name()).ok_or_else(|| {
                Error::NotFitted(format!("normalization statistics for '{}'", feature.name()))
            })?;
            if !stats.mean.is_finite() || !stats.std.is_finite() || stats.std < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "invalid normalization statistics for '{}': {:?}",
                    feature.name(),
                    stats
                )));
            }
            if let Some(ImputeValue::Label(label)) = self.imputations.get(feature.name()) {
                return Err(Error::InvalidInput(format!(
                    "numerical feature '{}' has label imputation '{}'",
                    feature.name(),
                    label
                )));
            }
        }

        for feature in self.schema.categorical_features() {
            let vocab = self.vocabs.get(feature.name()).ok_or_else(|| {
                Error::NotFitted(format!("vocabulary for '{}'", feature.name()))
            })?;
            let mut seen = AHashSet::with_capacity(vocab.len());
            if !vocab.iter().all(|category| seen.insert(category.as_str())) {
                return Err(Error::InvalidInput(format!(
                    "vocabulary for '{}' has duplicate categories",
                    feature.name()
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[inline]
    pub fn target(&self) -> &str {
        self.schema.target()
    }

    #[inline]
    pub fn query_col(&self) -> &str {
        self.schema.query_col()
    }

    #[inline]
    pub fn categorical_features(&self) -> &[FeatureDescriptor] {
        self.schema.categorical_features()
    }

    #[inline]
    pub fn numerical_features(&self) -> &[FeatureDescriptor] {
        self.schema.numerical_features()
    }

    #[inline]
    pub fn imputations(&self) -> &BTreeMap<String, ImputeValue> {
        &self.imputations
    }

    pub fn imputation(&self, feature: &str) -> Option<&ImputeValue> {
        self.imputations.get(feature)
    }

    #[inline]
    pub fn norm_stats(&self) -> &BTreeMap<String, NormStats> {
        &self.norm_stats
    }

    pub fn norm_stat(&self, feature: &str) -> Result<&NormStats> {
        self.norm_stats
            .get(feature)
            .ok_or_else(|| Error::NotFitted(format!("normalization statistics for '{}'", feature)))
    }

    #[inline]
    pub fn vocabs(&self) -> &BTreeMap<String, Vec<String>> {
        &self.vocabs
    }

    pub fn vocab(&self, feature: &str) -> Result<&[String]> {
        self.vocabs
            .get(feature)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::NotFitted(format!("vocabulary for '{}'", feature)))
    }

    /// Categories a feature is one-hot encoded into: the vocabulary, then
    /// [`OOV_TOKEN`] unless the vocabulary already holds it
    pub fn categories(&self, feature: &str) -> Result<Vec<String>> {
        let vocab = self.vocab(feature)?;
        let mut categories = vocab.to_vec();
        if !vocab.iter().any(|c| c == OOV_TOKEN) {
            categories.push(OOV_TOKEN.to_string());
        }
        Ok(categories)
    }

    /// Model-facing columns after preprocessing
    ///
    /// Numerical features in declaration order, then one indicator column
    /// per category of each categorical feature, in expansion order.
    pub fn expanded_feature_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .schema
            .numerical_features()
            .iter()
            .map(|f| f.name().to_string())
            .collect();

        for feature in self.schema.categorical_features() {
            // validate() guarantees every categorical feature has a vocabulary
            if let Ok(categories) = self.categories(feature.name()) {
                columns.extend(
                    categories
                        .iter()
                        .map(|category| one_hot_column(feature.name(), category)),
                );
            }
        }
        columns
    }
}
