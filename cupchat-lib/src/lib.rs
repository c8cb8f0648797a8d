//! CupChat - retrieval-augmented question answering over FIFA World Cup snippets
//!
//! # Architecture
//!
//! ```text
//! CSV -> Documents -> Embedder -> EmbeddingCache -> Corpus
//!                                                     |
//! Question -> Reformulator -> FusionRetriever <-------+
//!                                   |
//!                History -> AnswerComposer -> LLM -> Answer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use cupchat_lib::{
//!     answer::History,
//!     chat::ChatEngine,
//!     config::{EngineConfig, GenerationConfig},
//!     document::load_csv,
//!     embed::{EmbeddingCache, FastEmbedder, LocalModel},
//!     llm::ChatCompletionsClient,
//!     store::Corpus,
//! };
//!
//! let documents = load_csv("chunked_worldcup_data.csv")?;
//! let mut embedder = FastEmbedder::new(LocalModel::MiniLmL6V2)?;
//! let embeddings = EmbeddingCache::new("worldcup_embeddings.json").get_or_build(&mut embedder, &documents)?;
//! let corpus = Arc::new(Corpus::new(documents, embeddings)?);
//!
//! let generator = ChatCompletionsClient::new(&GenerationConfig::default())?;
//! let mut engine = ChatEngine::new(embedder, generator, corpus, EngineConfig::default());
//!
//! let mut history = History::new();
//! let turn = engine.handle_turn("Who won the 2022 world cup?", &history);
//! history.push("Who won the 2022 world cup?", &turn.answer);
//! ```

pub mod answer;
pub mod chat;
pub mod config;
pub mod document;
pub mod embed;
pub mod error;
pub mod llm;
pub mod reformulate;
pub mod search;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
