use crate::document::Document;
use crate::embed::Embedding;
use crate::store::cosine_similarity;
use crate::{Error, Result};

/// Documents and their embeddings, aligned by position.
///
/// Scoring is brute force over every document. That is fine for a corpus of
/// a few thousand snippets and is the scaling limit of this design.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    embeddings: Vec<Embedding>,
}

impl Corpus {
    /// Pair documents with embeddings.
    ///
    /// Fails unless there is exactly one embedding per document and all
    /// embeddings share a dimension.
    pub fn new(documents: Vec<Document>, embeddings: Vec<Embedding>) -> Result<Self> {
        if documents.len() != embeddings.len() {
            return Err(Error::InvalidInput(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }
        if let Some(first) = embeddings.first() {
            let dimension = first.len();
            if let Some(pos) = embeddings.iter().position(|e| e.len() != dimension) {
                return Err(Error::InvalidInput(format!(
                    "embedding {pos} has dimension {}, expected {dimension}",
                    embeddings[pos].len()
                )));
            }
        }
        Ok(Self {
            documents,
            embeddings,
        })
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    /// Dimension of the stored vectors, `None` when empty.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.embeddings.first().map(Vec::len)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Cosine similarity of every document to `query`, by position.
    pub fn similarities(&self, query: &[f32]) -> Result<Vec<f32>> {
        if let Some(dimension) = self.dimension() {
            if query.len() != dimension {
                return Err(Error::Embedding(format!(
                    "query has dimension {}, corpus has {dimension}",
                    query.len()
                )));
            }
        }
        Ok(self
            .embeddings
            .iter()
            .map(|embedding| cosine_similarity(query, embedding))
            .collect())
    }
}
