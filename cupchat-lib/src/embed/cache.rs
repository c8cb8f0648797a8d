use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

const CACHE_VERSION: u32 = 1;
const DEFAULT_BATCH_SIZE: usize = 64;

/// Persisted document embeddings, one vector per document in load order.
///
/// The cache is valid when it holds exactly as many vectors as there are
/// documents and every vector has the embedder's dimension. Any other count
/// or width, or a file that cannot be read, triggers a full rebuild. There is no per-document invalidation: editing a snippet
/// without changing the row count leaves a stale vector in place.
///
/// # Usage
///
/// ```ignore
/// use cupchat_lib::embed::EmbeddingCache;
///
/// let cache = EmbeddingCache::new("worldcup_embeddings.json");
/// let embeddings = cache.get_or_build(&mut embedder, &documents)?;
/// assert_eq!(embeddings.len(), documents.len());
/// ```
#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    path: PathBuf,
    batch_size: usize,
}

#[derive(Debug, Deserialize)]
struct CacheFile {
    version: u32,
    model: String,
    dimension: usize,
    vectors: Vec<Embedding>,
}

impl CacheFile {
    /// Every vector has the embedder's width.
    fn has_dimension(&self, dimension: usize) -> bool {
        self.vectors.is_empty()
            || (self.dimension == dimension && self.vectors.iter().all(|v| v.len() == dimension))
    }
}

impl EmbeddingCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Number of documents sent to the embedder per call when rebuilding.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return cached embeddings for `documents`, rebuilding them on mismatch.
    pub fn get_or_build<E: Embedder>(
        &self,
        embedder: &mut E,
        documents: &[Document],
    ) -> Result<Vec<Embedding>> {
        match self.load() {
            Ok(Some(file))
                if file.vectors.len() == documents.len() && file.has_dimension(embedder.dimension()) =>
            {
                if file.model != embedder.model_name() {
                    tracing::warn!(
                        cached = %file.model,
                        current = embedder.model_name(),
                        "embedding cache was built with a different model"
                    );
                }
                tracing::info!(path = %self.path.display(), count = file.vectors.len(), "embedding cache hit");
                return Ok(file.vectors);
            }
            Ok(Some(file)) if file.vectors.len() == documents.len() => {
                tracing::warn!(
                    cached = file.dimension,
                    current = embedder.dimension(),
                    model = embedder.model_name(),
                    "embedding dimension changed, regenerating"
                );
            }
            Ok(Some(file)) => {
                tracing::info!(
                    cached = file.vectors.len(),
                    documents = documents.len(),
                    "embedding count mismatch, regenerating"
                );
            }
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "no embedding cache, building");
            }
            Err(e) => {
                tracing::warn!(error = %e, "unreadable embedding cache, regenerating");
            }
        }

        let vectors = embed_all(embedder, documents, self.batch_size)?;
        if let Err(e) = self.save(embedder.model_name(), &vectors) {
            tracing::warn!(error = %e, "failed to persist embedding cache");
        }
        Ok(vectors)
    }

    /// Read the cache file, `Ok(None)` if it does not exist.
    fn load(&self) -> Result<Option<CacheFile>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Cache(format!("{}: {e}", self.path.display()))),
        };
        let file: CacheFile = serde_json::from_str(&data)
            .map_err(|e| Error::Cache(format!("{}: {e}", self.path.display())))?;
        if file.version != CACHE_VERSION {
            return Err(Error::Cache(format!(
                "unsupported cache version {} (expected {CACHE_VERSION})",
                file.version
            )));
        }
        Ok(Some(file))
    }

    /// Write all vectors, replacing the previous file atomically.
    fn save(&self, model: &str, vectors: &[Embedding]) -> Result<()> {
        #[derive(Serialize)]
        struct PersistedCache<'a> {
            version: u32,
            model: &'a str,
            dimension: usize,
            vectors: &'a [Embedding],
        }

        let state = PersistedCache {
            version: CACHE_VERSION,
            model,
            dimension: vectors.first().map_or(0, Vec::len),
            vectors,
        };
        let data = serde_json::to_string(&state).map_err(|e| Error::Cache(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::Cache(e.to_string()))?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, data)
            .map_err(|e| Error::Cache(format!("{}: {e}", temp_path.display())))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| Error::Cache(format!("{}: {e}", self.path.display())))?;

        tracing::debug!(path = %self.path.display(), count = vectors.len(), model, "saved embedding cache");
        Ok(())
    }
}

/// Embed every document, keeping one vector per document.
///
/// Blank documents are not sent to the embedder; they get a zero vector so
/// positions stay aligned. A zero vector scores 0 against every query.
pub fn embed_all<E: Embedder>(
    embedder: &mut E,
    documents: &[Document],
    batch_size: usize,
) -> Result<Vec<Embedding>> {
    let texts: Vec<(usize, &str)> = documents
        .iter()
        .enumerate()
        .filter(|(_, doc)| !doc.is_blank())
        .map(|(i, doc)| (i, doc.content.trim()))
        .collect();

    let mut embedded: Vec<Option<Embedding>> = vec![None; documents.len()];
    for batch in texts.chunks(batch_size.max(1)) {
        let inputs: Vec<&str> = batch.iter().map(|(_, text)| *text).collect();
        let vectors = embedder.embed_documents(&inputs)?;
        if vectors.len() != inputs.len() {
            return Err(Error::Embedding(format!(
                "embedder returned {} vectors for {} documents",
                vectors.len(),
                inputs.len()
            )));
        }
        for ((index, _), vector) in batch.iter().zip(vectors) {
            embedded[*index] = Some(vector);
        }
    }

    let blanks = documents.len() - texts.len();
    if blanks > 0 {
        tracing::warn!(blanks, "blank documents given zero-vector placeholders");
    }

    let dimension = embedded
        .iter()
        .flatten()
        .next()
        .map_or_else(|| embedder.dimension(), Vec::len);
    Ok(embedded
        .into_iter()
        .map(|v| v.unwrap_or_else(|| vec![0.0; dimension]))
        .collect())
}
