//! # rankprep Schema
//!
//! Declarative, fitted description of search-ranking data.
//!
//! ## Overview
//!
//! A schema lists the columns that matter for modelling a search-ranking
//! dataset: the target (e.g. a click), the query column used to group rows
//! for ranking evaluation, and the categorical and numerical features.
//!
//! **Lifecycle:**
//! 1. Build a [`Schema`] from its JSON configuration
//! 2. Fit it against a reference (training) dataset
//! 3. Share the resulting [`FittedSchema`] with every consumer
//!
//! Fitting learns, per feature:
//! - an imputation value (mean, median, mode, min, max or a fixed value)
//! - normalization statistics (mean / sample standard deviation)
//! - a sorted vocabulary of the observed categories
//!
//! ## Example
//!
//! ```rust
//! use rankprep_schema::{Schema, SchemaConfig};
//! use rankprep_core::Dataset;
//! use serde_json::json;
//!
//! let config = SchemaConfig::from_value(json!({
//!     "target": "clicked",
//!     "query_col": "query_id",
//!     "features": {
//!         "categorical": {"brand": {"impute": {"impute_type": "mode"}}},
//!         "numerical": {"price": {"impute": {"impute_type": "median"}}}
//!     }
//! })).unwrap();
//! let schema = Schema::build(&config).unwrap();
//!
//! let reference = Dataset::from_records(&[
//!     json!({"query_id": "q1", "clicked": 1, "brand": "acme", "price": 10.0}),
//!     json!({"query_id": "q1", "clicked": 0, "brand": "zeta", "price": null}),
//! ]).unwrap();
//! let fitted = schema.fit(&reference).unwrap();
//!
//! assert_eq!(
//!     fitted.expanded_feature_columns(),
//!     vec!["price", "brand_acme", "brand_zeta", "brand_<OOV>"]
//! );
//! ```

pub mod config;
pub mod feature;
pub mod fit;
pub mod fitted;
pub mod schema;

// Re-export main types
pub use config::{FeatureConfig, FeaturesConfig, SchemaConfig};
pub use feature::{FeatureDescriptor, FeatureKind, ImputeConfig, ImputeStrategy, ImputeValue};
pub use fit::{NormStats, StatisticsFitter};
pub use fitted::{one_hot_column, FittedSchema, OOV_TOKEN};
pub use schema::{Schema, SchemaBuilder};
