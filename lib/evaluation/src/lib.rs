//! # rankprep Evaluation
//!
//! Metrics for click / interaction models of search results.
//!
//! - [`get_pointwise_metrics`] scores every row independently
//!   (`roc_auc_score`, `log_loss`, ...)
//! - [`get_ranking_metrics`] groups rows by query, scores each result list
//!   (`ndcg_score`, `reciprocal_rank`, ...) and averages across queries
//!
//! Metric names resolve through a [`MetricRegistry`]; custom metrics are
//! added with [`MetricRegistry::register`].
//!
//! ## Example
//!
//! ```rust
//! use rankprep_evaluation::{calculate_query_ranking_metric, MetricRegistry};
//!
//! let registry = MetricRegistry::default();
//! let y_true = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0, 0.0]];
//! let y_score = vec![vec![0.8, 0.6, 0.7], vec![0.9, 0.95, 0.3, 0.4]];
//!
//! let ndcg = calculate_query_ranking_metric(&registry, &y_true, &y_score, "ndcg_score").unwrap();
//! assert_eq!(ndcg, 1.0);
//! ```

pub mod metrics;
pub mod pointwise;
pub mod ranking;
pub mod registry;

pub use pointwise::get_pointwise_metrics;
pub use ranking::{
    calculate_query_ranking_metric, evaluate_groups, get_ranking_metrics, group_by_query,
    QueryGroup,
};
pub use registry::{MetricFn, MetricRegistry};
