//! # rankprep Models
//!
//! Click / interaction models consuming preprocessed datasets.
//!
//! Every model implements [`ProbabilisticClassifier`]: `fit` on a dataset
//! and its target, then `predict_proba` returns `[p_negative, p_positive]`
//! per row. [`score_dataset`] appends the positive-class probability as a
//! prediction column ready for evaluation.
//!
//! Models:
//! - [`PopularityBaseline`] - per-item mean target
//! - [`LogisticRegression`] - L2-regularised linear model
//!
//! [`build_model`] creates either from a serde-tagged [`ModelConfig`].

pub mod factory;
pub mod logistic;
pub mod model;
pub mod popularity;

pub use factory::{build_model, ModelConfig};
pub use logistic::{Coefficients, LogisticRegression};
pub use model::{score_dataset, ProbabilisticClassifier};
pub use popularity::PopularityBaseline;
