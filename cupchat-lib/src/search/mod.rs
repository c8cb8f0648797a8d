//! Multi-query fusion retrieval
//!
//! Combines the reformulator, embedder and corpus into one ranking.
//!
//! # Scoring
//!
//! Every query variant (the original question plus its paraphrases) is
//! embedded and compared with every document. The raw cosine similarities
//! are summed per document, so a snippet that several phrasings agree on
//! rises above one that only a single phrasing likes. Scores are not
//! rank positions: this is additive similarity fusion, not reciprocal rank
//! fusion, and it is sensitive to the scale of the embedding space.
//!
//! Cost is one similarity per variant per document.
//!
//! # Usage
//!
//! ```ignore
//! use cupchat_lib::{reformulate::QueryReformulator, search::FusionRetriever};
//!
//! let reformulator = QueryReformulator::new(&generator, 0.7);
//! let mut retriever = FusionRetriever::new(&mut embedder);
//! let results = retriever.retrieve(&reformulator, "Who won in 2022?", &corpus, 10, 3)?;
//! ```

use crate::embed::Embedder;
use crate::llm::Generator;
use crate::reformulate::QueryReformulator;
use crate::store::{Corpus, SearchResult};
use crate::Result;

/// Retrieves documents by summing similarity across query variants.
pub struct FusionRetriever<E: Embedder> {
    embedder: E,
}

impl<E: Embedder> FusionRetriever<E> {
    #[must_use]
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    /// Expand `query` into up to `n_reformulations` paraphrases and return
    /// the `k` best documents by fused score, highest first.
    ///
    /// A reformulation failure leaves only the original query; it never
    /// fails retrieval.
    pub fn retrieve<G: Generator>(
        &mut self,
        reformulator: &QueryReformulator<G>,
        query: &str,
        corpus: &Corpus,
        k: usize,
        n_reformulations: usize,
    ) -> Result<Vec<SearchResult>> {
        if corpus.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut variants = vec![query.to_string()];
        variants.extend(reformulator.reformulate(query, n_reformulations));
        self.retrieve_variants(&variants, corpus, k)
    }

    /// Rank documents for an explicit variant set. The first variant is the
    /// original query.
    ///
    /// Failing to embed the original query is an error. A paraphrase that
    /// cannot be embedded is skipped.
    pub fn retrieve_variants(
        &mut self,
        variants: &[String],
        corpus: &Corpus,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        if corpus.is_empty() || k == 0 || variants.is_empty() {
            return Ok(Vec::new());
        }

        let mut scores = vec![0.0f32; corpus.len()];
        let mut used = 0usize;
        for (i, variant) in variants.iter().enumerate() {
            let embedding = match self.embedder.embed_query(variant) {
                Ok(embedding) => embedding,
                Err(e) if i > 0 => {
                    tracing::warn!(error = %e, variant = %variant, "skipping query variant");
                    continue;
                }
                Err(e) => return Err(e),
            };
            for (total, similarity) in scores.iter_mut().zip(corpus.similarities(&embedding)?) {
                *total += similarity;
            }
            used += 1;
        }
        tracing::debug!(variants = used, documents = corpus.len(), "fused query scores");

        Ok(top_k(&scores, k)
            .into_iter()
            .filter_map(|index| {
                corpus.get(index).map(|document| SearchResult {
                    index,
                    document: document.clone(),
                    score: scores[index],
                })
            })
            .collect())
    }
}

/// Indices of the `k` highest scores, highest first. Equal scores keep
/// ascending index order.
fn top_k(scores: &[f32], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    indices.truncate(k);
    indices
}
