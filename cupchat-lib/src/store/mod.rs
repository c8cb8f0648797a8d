//! Aligned document and vector storage
//!
//! # Storage Model
//!
//! A [`Corpus`] holds two sequences of the same length:
//! - Documents: the snippet text and metadata
//! - Embeddings: the vector for the document at the same position
//!
//! Both are read-only once built, so a corpus can be shared between
//! sessions behind an `Arc` without locking.
//!
//! # Usage
//!
//! ```ignore
//! use cupchat_lib::store::Corpus;
//!
//! let corpus = Corpus::new(documents, embeddings)?;
//!
//! // Similarity of every document to a query vector, by position
//! let scores = corpus.similarities(&query_embedding)?;
//! ```

use crate::document::Document;

/// A retrieved document with its score
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Position of the document in the corpus
    pub index: usize,
    /// The matched document
    pub document: Document,
    /// Fused similarity score (higher is more relevant).
    /// Each query variant contributes a cosine similarity in [-1, 1].
    pub score: f32,
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 means identical direction. A zero
/// vector is similar to nothing and scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

mod corpus;

pub use corpus::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &a);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_ignores_magnitude() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![10.0, 20.0, 30.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }
}
