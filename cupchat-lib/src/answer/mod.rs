//! Grounded answer composition
//!
//! Builds the final prompt from the retrieved snippets and the conversation
//! so far, then asks the language model for an answer. The model is told to
//! answer only from the snippets and to reply with [`REFUSAL`] when they do
//! not contain the answer; that refusal is the model's decision, so an empty
//! context still goes to the service.

use crate::document::Document;
use crate::llm::{CompletionRequest, Generator};
use crate::{Error, Result};

/// Reply the model is instructed to give when the context lacks the answer.
pub const REFUSAL: &str =
    "I don't have that information, please visit www.footballhistory.org for more information.";

/// Reply returned when the generation service fails.
pub const FALLBACK_ANSWER: &str = "I'm having trouble answering that right now.";

const ANSWER_SYSTEM: &str = "You are a helpful assistant.";
const ANSWER_TEMPERATURE: f32 = 0.7;

/// Composes answers grounded in retrieved documents, always sampling at 0.7.
pub struct AnswerComposer<G> {
    generator: G,
}

impl<G: Generator> AnswerComposer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Answer `query`, or [`FALLBACK_ANSWER`] if the service fails.
    pub fn answer(&self, query: &str, top_docs: &[Document], history: &History) -> String {
        match self.try_answer(query, top_docs, history) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "answer generation failed, using fallback");
                FALLBACK_ANSWER.to_string()
            }
        }
    }

    /// Answer `query`, with [`Error::GenerationFailed`] on failure.
    pub fn try_answer(&self, query: &str, top_docs: &[Document], history: &History) -> Result<String> {
        let prompt = build_prompt(query, top_docs, history);
        self.generator
            .complete(&CompletionRequest {
                system: ANSWER_SYSTEM,
                prompt: &prompt,
                temperature: ANSWER_TEMPERATURE,
            })
            .map_err(|e| Error::GenerationFailed(e.to_string()))
    }
}

/// The user prompt for one turn: instructions, context, then transcript.
pub fn build_prompt(query: &str, top_docs: &[Document], history: &History) -> String {
    let context = top_docs
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Answer the user's latest question strictly using the facts in the context below. \
         Use the previous conversation history to resolve vague references like 'it' or 'they'. \
         Do not explain your reasoning or state assumptions. \
         If the answer is not in the context, say: '{REFUSAL}'\n\n\
         Context:\n{context}\n\n\
         Conversation History:\n{}",
        history.transcript(query)
    )
}

mod history;

pub use history::*;
