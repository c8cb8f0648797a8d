//! Text embedding using local models
//!
//! Uses sentence-transformers/all-MiniLM-L6-v2 by default via the fastembed
//! crate (ONNX runtime). BAAI/bge-large-en-v1.5 is available for higher
//! recall at roughly ten times the model size.
//!
//! # Model Details
//!
//! | model            | dimensions | query prefix |
//! |------------------|------------|--------------|
//! | all-MiniLM-L6-v2 | 384        | no           |
//! | bge-large-en-v1.5| 1024       | yes          |
//!
//! # Usage
//!
//! ```ignore
//! use cupchat_lib::embed::{Embedder, FastEmbedder, LocalModel};
//!
//! let mut embedder = FastEmbedder::new(LocalModel::MiniLmL6V2)?;
//!
//! // Embed documents (for the cache)
//! let doc_embeddings = embedder.embed_documents(&["Argentina won in 2022."])?;
//!
//! // Embed query (for retrieval)
//! let query_embedding = embedder.embed_query("Who won in 2022?")?;
//! ```

use crate::Result;

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
pub trait Embedder: Send + Sync {
    /// Embed multiple documents for indexing
    ///
    /// Documents may be batched for efficiency.
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query for searching
    ///
    /// Note: Some models (like BGE) use different prompts for queries vs documents.
    /// This method handles that distinction.
    fn embed_query(&mut self, text: &str) -> Result<Embedding>;

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for &mut E {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        (**self).embed_documents(texts)
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        (**self).embed_query(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

mod cache;
mod local;

pub use cache::*;
pub use local::*;
