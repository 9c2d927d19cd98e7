//! # rankprep Core
//!
//! Core library for the rankprep search-ranking toolkit.
//!
//! This crate provides the fundamental data structures shared by every
//! other crate of the workspace:
//!
//! - [`Dataset`] - In-memory table of named numeric / categorical columns
//! - [`FeatureMatrix`] - Dense row-major model input
//! - [`stats`] - Missing-aware descriptive statistics
//! - [`Error`] - The error type shared by the pipeline crates
//!
//! ## Example
//!
//! ```rust
//! use rankprep_core::Dataset;
//! use serde_json::json;
//!
//! let dataset = Dataset::from_records(&[
//!     json!({"query_id": "q1", "price": 12.5, "brand": "acme"}),
//!     json!({"query_id": "q1", "price": null, "brand": "zeta"}),
//! ]).unwrap();
//!
//! assert_eq!(dataset.num_rows(), 2);
//! assert_eq!(dataset.numeric("price").unwrap()[1], None);
//! ```

pub mod dataset;
pub mod error;
pub mod matrix;
pub mod stats;

pub use dataset::{render_number, Column, ColumnData, Dataset};
pub use error::{Error, Result};
pub use matrix::FeatureMatrix;
