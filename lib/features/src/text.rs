//! Text similarity features
//!
//! Query / item text pairs are embedded with a [`TextEmbedder`] and
//! compared with cosine similarity. The embedder is an explicit value
//! owned by the caller; swap in a learned model by implementing the trait.

use ahash::{AHashSet, RandomState};
use rankprep_core::{ColumnData, Dataset, Result};
use std::hash::{BuildHasher, Hash, Hasher};

/// Default dimension of hashed text embeddings
pub const DEFAULT_TEXT_DIM: usize = 256;

/// Maps text to a fixed-size vector
pub trait TextEmbedder: Send + Sync {
    fn dim(&self) -> usize;

    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Character trigrams of a lowercased, space-padded string
fn trigrams(s: &str) -> AHashSet<String> {
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();
    chars
        .windows(3)
        .map(|w| w.iter().collect::<String>())
        .collect()
}

/// Fixed hasher seeds; bucket assignment must not vary between processes
const BUCKET_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

fn bucket<T: Hash + ?Sized>(value: &T, dim: usize) -> usize {
    let state = RandomState::with_seeds(
        BUCKET_SEEDS[0],
        BUCKET_SEEDS[1],
        BUCKET_SEEDS[2],
        BUCKET_SEEDS[3],
    );
    let mut hasher = state.build_hasher();
    value.hash(&mut hasher);
    (hasher.finish() as usize) % dim
}

/// Feature-hashing embedder over character trigrams and words
///
/// Needs no model download; similar spellings and shared words land in
/// the same buckets. Vectors are L2-normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingEmbedder {
    dim: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_DIM)
    }
}

impl HashingEmbedder {
    /// `dim` is raised to 1 if zero
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl TextEmbedder for HashingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();
        if normalized.trim().is_empty() {
            return vector;
        }

        for trigram in trigrams(&normalized) {
            vector[bucket(&trigram, self.dim)] += 1.0;
        }
        // words weigh more than their trigrams
        for word in normalized.split_whitespace() {
            vector[bucket(word, self.dim)] += 2.0;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }
        vector
    }
}

/// Cosine similarity in [-1, 1]; 0 when either vector is all zeros
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

pub fn text_cosine_similarity(embedder: &dyn TextEmbedder, text_1: &str, text_2: &str) -> f64 {
    cosine_similarity(&embedder.embed(text_1), &embedder.embed(text_2))
}

/// Add `output_col` with the similarity of `left_col` and `right_col` per row
///
/// Rows missing either text get a missing similarity.
pub fn add_text_similarity_column(
    dataset: &Dataset,
    embedder: &dyn TextEmbedder,
    left_col: &str,
    right_col: &str,
    output_col: &str,
) -> Result<Dataset> {
    let left = dataset.categorical(left_col)?;
    let right = dataset.categorical(right_col)?;
    let similarities = left
        .iter()
        .zip(right.iter())
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some(text_cosine_similarity(embedder, a, b)),
            _ => None,
        })
        .collect();
    dataset
        .clone()
        .with_column(output_col, ColumnData::Numeric(similarities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedding_is_normalised() {
        let embedder = HashingEmbedder::default();
        let v = embedder.embed("Water Bottle");
        assert_eq!(v.len(), DEFAULT_TEXT_DIM);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert_eq!(v, embedder.embed("water bottle"));
    }

    #[test]
    fn test_related_texts_are_more_similar() {
        let embedder = HashingEmbedder::default();
        let related = text_cosine_similarity(&embedder, "water bottle", "bottle of water");
        let unrelated = text_cosine_similarity(&embedder, "flat screen tv", "a relaxing otter");
        assert!(related > unrelated);
        for s in [related, unrelated] {
            assert!((-1.0..=1.0).contains(&s));
        }
        assert!((text_cosine_similarity(&embedder, "jacket", "jacket") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_buckets_are_stable_across_embedders() {
        let a = HashingEmbedder::new(64).embed("Red running shoes");
        let b = HashingEmbedder::new(64).embed("red running shoes");
        assert_eq!(a, b);

        let word = "shoes".to_string();
        assert_eq!(bucket(&word, 1 << 20), bucket("shoes", 1 << 20));
        assert_eq!(bucket("shoes", 1 << 20), bucket("shoes", 1 << 20));
        assert_ne!(bucket("shoes", 1 << 20), bucket("jacket", 1 << 20));
    }

    #[test]
    fn test_empty_text() {
        let embedder = HashingEmbedder::new(16);
        assert!(embedder.embed("   ").iter().all(|v| *v == 0.0));
        assert_eq!(text_cosine_similarity(&embedder, "", "jacket"), 0.0);
    }

    #[test]
    fn test_add_text_similarity_column() {
        let data = Dataset::from_records(&[
            json!({"query": "red jacket", "title": "Red Jacket"}),
            json!({"query": "red jacket", "title": null}),
        ])
        .unwrap();
        let result = add_text_similarity_column(
            &data,
            &HashingEmbedder::default(),
            "query",
            "title",
            "query_title_similarity",
        )
        .unwrap();
        let sims = result.numeric("query_title_similarity").unwrap();
        assert!((sims[0].unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(sims[1], None);
    }
}
