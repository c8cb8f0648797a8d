use std::fmt;
use std::str::FromStr;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// Local embedding models supported by [`FastEmbedder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocalModel {
    /// sentence-transformers/all-MiniLM-L6-v2, 384 dimensions (~90MB)
    #[default]
    MiniLmL6V2,
    /// BAAI/bge-large-en-v1.5, 1024 dimensions (~1.2GB)
    BgeLargeEnV15,
}

impl LocalModel {
    pub fn name(self) -> &'static str {
        match self {
            Self::MiniLmL6V2 => "sentence-transformers/all-MiniLM-L6-v2",
            Self::BgeLargeEnV15 => "BAAI/bge-large-en-v1.5",
        }
    }

    pub fn dimension(self) -> usize {
        match self {
            Self::MiniLmL6V2 => 384,
            Self::BgeLargeEnV15 => 1024,
        }
    }

    /// Prompt prefix applied to queries but not documents.
    fn query_prefix(self) -> Option<&'static str> {
        match self {
            Self::MiniLmL6V2 => None,
            Self::BgeLargeEnV15 => Some("Represent this sentence for searching relevant passages: "),
        }
    }

    fn fastembed_model(self) -> EmbeddingModel {
        match self {
            Self::MiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
            Self::BgeLargeEnV15 => EmbeddingModel::BGELargeENV15,
        }
    }
}

impl fmt::Display for LocalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocalModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "minilm" | "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
                Ok(Self::MiniLmL6V2)
            }
            "bge" | "bge-large-en-v1.5" | "baai/bge-large-en-v1.5" => Ok(Self::BgeLargeEnV15),
            other => Err(Error::InvalidInput(format!("unknown embedding model '{other}'"))),
        }
    }
}

/// Embedder running a [`LocalModel`] in-process.
///
/// Uses fastembed for ONNX-based inference. The model is downloaded on first
/// use and cached by fastembed.
pub struct FastEmbedder {
    model: TextEmbedding,
    kind: LocalModel,
}

impl FastEmbedder {
    /// Load the given model, downloading it if needed.
    pub fn new(kind: LocalModel) -> Result<Self> {
        let opts = InitOptions::new(kind.fastembed_model()).with_show_download_progress(true);

        TextEmbedding::try_new(opts)
            .map(|model| Self { model, kind })
            .map_err(|e| Error::Embedding(e.to_string()))
    }
}

impl Embedder for FastEmbedder {
    fn model_name(&self) -> &str {
        self.kind.name()
    }

    fn dimension(&self) -> usize {
        self.kind.dimension()
    }

    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.model
            .embed(texts, None)
            .map_err(|e| Error::Embedding(e.to_string()))
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        let query_text = match self.kind.query_prefix() {
            Some(prefix) => format!("{prefix}{text}"),
            None => text.to_string(),
        };

        self.model
            .embed(vec![query_text], None)
            .map_err(|e| Error::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_names() {
        assert_eq!("minilm".parse::<LocalModel>().unwrap(), LocalModel::MiniLmL6V2);
        assert_eq!("BGE".parse::<LocalModel>().unwrap(), LocalModel::BgeLargeEnV15);
        assert_eq!(
            "sentence-transformers/all-MiniLM-L6-v2".parse::<LocalModel>().unwrap(),
            LocalModel::MiniLmL6V2
        );
        assert!("word2vec".parse::<LocalModel>().is_err());
    }

    #[test]
    fn test_default_model_is_minilm() {
        assert_eq!(LocalModel::default(), LocalModel::MiniLmL6V2);
        assert_eq!(LocalModel::default().dimension(), 384);
    }

    #[test]
    #[ignore] // Requires model download, run with: cargo test -- --ignored
    fn test_minilm_dimension_matches() {
        let mut embedder = FastEmbedder::new(LocalModel::MiniLmL6V2).unwrap();
        let embedding = embedder.embed_query("Who won the 2022 World Cup?").unwrap();
        assert_eq!(embedding.len(), embedder.dimension());
    }

    #[test]
    #[ignore] // Requires model download
    fn test_related_text_scores_higher() {
        let mut embedder = FastEmbedder::new(LocalModel::MiniLmL6V2).unwrap();
        let query = embedder.embed_query("Who won the World Cup in 2022?").unwrap();
        let docs = embedder
            .embed_documents(&[
                "Argentina beat France on penalties in the 2022 final.",
                "The weather in London was cloudy with occasional rain.",
            ])
            .unwrap();

        let related = crate::store::cosine_similarity(&query, &docs[0]);
        let unrelated = crate::store::cosine_similarity(&query, &docs[1]);
        assert!(related > unrelated, "{related:.4} vs {unrelated:.4}");
    }
}
