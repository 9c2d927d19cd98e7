//! # rankprep Preprocess
//!
//! Turns raw search-ranking rows into model-ready columns using the
//! statistics of a [`FittedSchema`](rankprep_schema::FittedSchema).
//!
//! ## Pipeline
//!
//! [`Preprocessor::apply`] runs, in order:
//! 1. column restriction to the modeled columns (optional)
//! 2. [`impute`] - fill missing values with the learned imputations
//! 3. [`map_oov_categories`] - replace unknown categories by `<OOV>`
//! 4. [`normalize_numerical_features`] - z-score with an epsilon guard
//! 5. [`OneHotEncoder`] - one indicator column per category
//!
//! ## Example
//!
//! ```rust
//! use rankprep_core::Dataset;
//! use rankprep_preprocess::Preprocessor;
//! use rankprep_schema::{ImputeStrategy, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder("clicked", "query_id")
//!     .categorical("brand", ImputeStrategy::Mode)
//!     .numerical("price", ImputeStrategy::Mean)
//!     .build()
//!     .unwrap();
//! let reference = Dataset::from_records(&[
//!     json!({"query_id": "q1", "clicked": 1, "brand": "acme", "price": 10.0}),
//!     json!({"query_id": "q1", "clicked": 0, "brand": "zeta", "price": 30.0}),
//! ]).unwrap();
//!
//! let preprocessor = Preprocessor::fit(&reference, &schema).unwrap();
//! let incoming = Dataset::from_records(&[
//!     json!({"query_id": "q2", "clicked": 0, "brand": "kids", "price": null}),
//! ]).unwrap();
//! let processed = preprocessor.apply(&incoming).unwrap();
//!
//! assert_eq!(processed.numeric("price").unwrap(), &[Some(0.0)]);
//! assert_eq!(processed.numeric("brand_<OOV>").unwrap(), &[Some(1.0)]);
//! ```

pub mod encoder;
pub mod impute;
pub mod normalize;
pub mod oov;
pub mod preprocessor;
pub mod split;

pub use encoder::{EncodedFeature, OneHotEncoder};
pub use impute::impute;
pub use normalize::{normalize_numerical_features, DEFAULT_EPSILON};
pub use oov::map_oov_categories;
pub use preprocessor::{Preprocessor, PreprocessorOptions};
pub use split::{drop_unmodeled_columns, split_dataset};
