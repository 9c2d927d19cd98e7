//! # rankprep Features
//!
//! Feature engineering applied before schema preprocessing:
//!
//! - [`timestamp`] - calendar parts of event timestamps
//! - [`text`] - query / item text similarity from a [`TextEmbedder`]
//!
//! ## Example
//!
//! ```rust
//! use rankprep_features::{text_cosine_similarity, timestamp_part, HashingEmbedder, TimestampPart};
//!
//! let hour = timestamp_part("2024-07-01 01:00:00", TimestampPart::Hour, "%Y-%m-%d %H:%M:%S").unwrap();
//! assert_eq!(hour, 1);
//!
//! let embedder = HashingEmbedder::default();
//! let similarity = text_cosine_similarity(&embedder, "water bottle", "bottle of water");
//! assert!(similarity > 0.5);
//! ```

pub mod text;
pub mod timestamp;

pub use text::{
    add_text_similarity_column, cosine_similarity, text_cosine_similarity, HashingEmbedder,
    TextEmbedder, DEFAULT_TEXT_DIM,
};
pub use timestamp::{
    add_timestamp_part_column, parse_timestamp, timestamp_part, TimestampPart,
    DEFAULT_TIMESTAMP_FORMAT,
};
