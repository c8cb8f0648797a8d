//! One conversational turn, end to end
//!
//! ```text
//! question -> QueryReformulator -> FusionRetriever -> AnswerComposer -> answer
//!                                        ^                  ^
//!                                     Corpus             History
//! ```
//!
//! The engine never keeps conversation state. Callers pass their
//! [`History`] in and push the finished exchange afterwards, one turn at a
//! time per session. The corpus sits behind an `Arc` so several engines can
//! share it.
//!
//! # Usage
//!
//! ```ignore
//! use cupchat_lib::{answer::History, chat::ChatEngine};
//!
//! let mut engine = ChatEngine::new(embedder, generator, corpus, EngineConfig::default());
//! let mut history = History::new();
//!
//! let turn = engine.handle_turn("Who won in 2022?", &history);
//! history.push("Who won in 2022?", &turn.answer);
//! ```

use std::sync::Arc;

use crate::answer::{AnswerComposer, History};
use crate::config::EngineConfig;
use crate::embed::Embedder;
use crate::llm::Generator;
use crate::reformulate::QueryReformulator;
use crate::search::FusionRetriever;
use crate::store::{Corpus, SearchResult};
use crate::Result;

/// Outcome of one turn
#[derive(Debug, Clone)]
pub struct Turn {
    /// Text to show the user; always present
    pub answer: String,
    /// Documents the answer prompt was grounded in, best first
    pub sources: Vec<SearchResult>,
}

/// Retrieval-augmented chat over a shared corpus.
pub struct ChatEngine<E: Embedder, G: Generator> {
    embedder: E,
    generator: G,
    corpus: Arc<Corpus>,
    config: EngineConfig,
}

impl<E: Embedder, G: Generator> ChatEngine<E, G> {
    pub fn new(embedder: E, generator: G, corpus: Arc<Corpus>, config: EngineConfig) -> Self {
        Self {
            embedder,
            generator,
            corpus,
            config,
        }
    }

    /// Answer `query` in the context of `history`.
    ///
    /// Never fails: a retrieval error leaves the prompt without context and
    /// a generation error yields the fallback answer.
    pub fn handle_turn(&mut self, query: &str, history: &History) -> Turn {
        let sources = match self.search(query) {
            Ok(sources) => sources,
            Err(e) => {
                tracing::warn!(error = %e, "retrieval failed, answering without context");
                Vec::new()
            }
        };

        let documents: Vec<_> = sources.iter().map(|r| r.document.clone()).collect();
        let answer = AnswerComposer::new(&self.generator).answer(query, &documents, history);

        tracing::info!(sources = sources.len(), history = history.len(), "answered turn");
        Turn { answer, sources }
    }

    /// Fused retrieval for `query` using the configured `top_k` and
    /// reformulation count.
    pub fn search(&mut self, query: &str) -> Result<Vec<SearchResult>> {
        let reformulator =
            QueryReformulator::new(&self.generator, self.config.reformulation_temperature);
        FusionRetriever::new(&mut self.embedder).retrieve(
            &reformulator,
            query,
            &self.corpus,
            self.config.top_k,
            self.config.reformulations,
        )
    }

    #[must_use]
    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::FALLBACK_ANSWER;
    use crate::document::Document;
    use crate::testing::{KeywordEmbedder, ScriptedGenerator};

    const KEYWORDS: &[&str] = &["argentina", "germany", "2022", "2014", "won"];

    fn corpus(embedder: &KeywordEmbedder) -> Arc<Corpus> {
        let documents = vec![
            Document::new("Argentina won in 2022.").with_year("2022"),
            Document::new("Germany won in 2014.").with_year("2014"),
        ];
        let embeddings = documents.iter().map(|d| embedder.vector(&d.content)).collect();
        Arc::new(Corpus::new(documents, embeddings).unwrap())
    }

    fn config(top_k: usize) -> EngineConfig {
        EngineConfig {
            top_k,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_turn_grounds_answer_in_top_documents() {
        let embedder = KeywordEmbedder::new(KEYWORDS);
        let corpus = corpus(&embedder);
        let generator = ScriptedGenerator::replying("Argentina.")
            .with_rewrites("- Which team won 2022?\n- 2022 winners?\n- Champions of 2022?");
        let mut engine = ChatEngine::new(embedder, &generator, corpus, config(1));

        let turn = engine.handle_turn("Who won in 2022?", &History::new());

        assert_eq!(turn.answer, "Argentina.");
        assert_eq!(turn.sources.len(), 1);
        assert_eq!(turn.sources[0].document.content, "Argentina won in 2022.");

        let requests = generator.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].prompt.contains("Context:\nArgentina won in 2022.\n\nConversation History:"));
        assert_eq!(engine.embedder().query_calls, 4);
    }

    #[test]
    fn test_history_flows_into_prompt() {
        let embedder = KeywordEmbedder::new(KEYWORDS);
        let corpus = corpus(&embedder);
        let generator = ScriptedGenerator::replying("Lionel Messi.");
        let mut engine = ChatEngine::new(embedder, &generator, corpus, config(2));

        let mut history = History::new();
        history.push("Who won in 2022?", "Argentina.");
        let turn = engine.handle_turn("Who was their captain?", &history);
        history.push("Who was their captain?", &turn.answer);

        let requests = generator.requests();
        let prompt = &requests.last().unwrap().prompt;
        assert!(prompt.ends_with("1. User: Who won in 2022?\n   Assistant: Argentina.\n2. User: Who was their captain?"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.exchanges()[1].answer, "Lionel Messi.");
    }

    #[test]
    fn test_answer_temperature_not_configurable() {
        let embedder = KeywordEmbedder::new(KEYWORDS);
        let corpus = corpus(&embedder);
        let generator = ScriptedGenerator::replying("Argentina.").with_rewrites("- Which team won 2022?");
        let config = EngineConfig {
            reformulation_temperature: 0.2,
            ..config(1)
        };
        let mut engine = ChatEngine::new(embedder, &generator, corpus, config);

        engine.handle_turn("Who won in 2022?", &History::new());

        let requests = generator.requests();
        assert_eq!(requests.len(), 2);
        assert!((requests[0].temperature - 0.2).abs() < f32::EPSILON);
        assert!((requests[1].temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_service_down_still_answers() {
        let embedder = KeywordEmbedder::new(KEYWORDS);
        let corpus = corpus(&embedder);
        let generator = ScriptedGenerator::failing();
        let mut engine = ChatEngine::new(embedder, &generator, corpus, config(2));

        let turn = engine.handle_turn("Who won in 2022?", &History::new());

        assert_eq!(turn.answer, FALLBACK_ANSWER);
        // reformulation failed, retrieval still ran on the original query
        assert_eq!(turn.sources.len(), 2);
        assert_eq!(engine.embedder().query_calls, 1);
    }

    #[test]
    fn test_retrieval_failure_answers_without_context() {
        let mut embedder = KeywordEmbedder::new(KEYWORDS);
        embedder.fail_on = Some("Who");
        let corpus = corpus(&embedder);
        let generator = ScriptedGenerator::replying("I don't know.");
        let mut engine = ChatEngine::new(embedder, &generator, corpus, config(2));

        let turn = engine.handle_turn("Who won in 2022?", &History::new());

        assert!(turn.sources.is_empty());
        assert_eq!(turn.answer, "I don't know.");
        assert!(generator.requests().last().unwrap().prompt.contains("Context:\n\n\n"));
    }

    #[test]
    fn test_sessions_share_corpus() {
        let embedder = KeywordEmbedder::new(KEYWORDS);
        let corpus = corpus(&embedder);
        let generator = ScriptedGenerator::replying("ok");

        let first = ChatEngine::new(embedder, &generator, Arc::clone(&corpus), config(1));
        let second = ChatEngine::new(KeywordEmbedder::new(KEYWORDS), &generator, Arc::clone(&corpus), config(1));

        assert!(Arc::ptr_eq(first.corpus(), second.corpus()));
        assert_eq!(Arc::strong_count(&corpus), 3);
    }
}
