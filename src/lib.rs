//! # rankprep
//!
//! Schema-driven preprocessing and evaluation for search-ranking models.
//!
//! rankprep turns raw query/result interaction rows into model-ready
//! feature columns using statistics learned from a reference dataset, and
//! scores ranking models per query.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! rankprep fit --schema schema.json --data train.json --store ./artifacts --name v1
//! rankprep transform --store ./artifacts --name v1 --data test.json --out test.processed.json
//! rankprep evaluate --store ./artifacts --name v1 --data scored.json --ranking ndcg_score
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use rankprep::prelude::*;
//! use serde_json::json;
//!
//! let config = SchemaConfig::from_value(json!({
//!     "target": "interacted",
//!     "query_col": "query_id",
//!     "features": {
//!         "categorical": {"p_c_f_2": {"impute": {"impute_type": "mode"}}},
//!         "numerical": {"p_n_f_1": {"impute": {"impute_type": "val", "val": -50.0}}}
//!     }
//! })).unwrap();
//! let schema = Schema::build(&config).unwrap();
//!
//! let train = Dataset::from_records(&[
//!     json!({"query_id": "q1", "interacted": 1, "p_c_f_2": "jacket", "p_n_f_1": 120.0}),
//!     json!({"query_id": "q1", "interacted": 0, "p_c_f_2": "food", "p_n_f_1": 80.0}),
//! ]).unwrap();
//!
//! let preprocessor = Preprocessor::fit(&train, &schema).unwrap();
//! let processed = preprocessor.apply(&train).unwrap();
//! assert!(processed.has_column("p_c_f_2_<OOV>"));
//! ```
//!
//! ## Crate Structure
//!
//! - [`rankprep-core`](https://docs.rs/rankprep-core) - Dataset model, statistics, errors
//! - [`rankprep-schema`](https://docs.rs/rankprep-schema) - Schema configuration and fitting
//! - [`rankprep-preprocess`](https://docs.rs/rankprep-preprocess) - Imputation, OOV mapping, normalization, one-hot encoding
//! - [`rankprep-evaluation`](https://docs.rs/rankprep-evaluation) - Pointwise and per-query ranking metrics
//! - [`rankprep-models`](https://docs.rs/rankprep-models) - Baseline and logistic regression click models
//! - [`rankprep-features`](https://docs.rs/rankprep-features) - Timestamp and text similarity features
//! - [`rankprep-storage`](https://docs.rs/rankprep-storage) - Checksummed fitted statistics artifacts

// Re-export core types
pub use rankprep_core::{Column, ColumnData, Dataset, Error, FeatureMatrix, Result};

// Re-export schema
pub use rankprep_schema::{
    FeatureDescriptor, FeatureKind, FittedSchema, ImputeStrategy, ImputeValue, NormStats, Schema,
    SchemaConfig, OOV_TOKEN,
};

// Re-export preprocessing
pub use rankprep_preprocess::{
    drop_unmodeled_columns, split_dataset, OneHotEncoder, Preprocessor, PreprocessorOptions,
    DEFAULT_EPSILON,
};

// Re-export evaluation
pub use rankprep_evaluation::{
    calculate_query_ranking_metric, get_pointwise_metrics, get_ranking_metrics, MetricRegistry,
    QueryGroup,
};

// Re-export models
pub use rankprep_models::{
    build_model, score_dataset, LogisticRegression, ModelConfig, PopularityBaseline,
    ProbabilisticClassifier,
};

// Re-export features
pub use rankprep_features::{HashingEmbedder, TextEmbedder, TimestampPart};

// Re-export storage
pub use rankprep_storage::ArtifactStore;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Dataset, Error, FittedSchema, ImputeStrategy, MetricRegistry, Preprocessor,
        PreprocessorOptions, ProbabilisticClassifier, Result, Schema, SchemaConfig,
    };
}

/// Metric functions usable outside the registry
pub mod metrics {
    pub use rankprep_evaluation::metrics::{
        average_precision_score, brier_score_loss, dcg_score, log_loss, ndcg_score,
        reciprocal_rank, roc_auc_score,
    };
}
