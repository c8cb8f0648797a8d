//! Generative-text service
//!
//! The engine talks to the language model through [`Generator`]: one system
//! instruction, one user prompt, one sampling temperature in, one completion
//! out. Any failure (transport, status, malformed body) comes back as
//! [`Error::Generation`](crate::Error::Generation); callers decide the
//! fallback.

use crate::Result;

/// Request envelope passed to a [`Generator`].
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
}

/// Trait for text completion backends
pub trait Generator: Send + Sync {
    /// Produce a single completion for the request.
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

impl<G: Generator + ?Sized> Generator for &G {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        (**self).complete(request)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

mod chat_completions;

pub use chat_completions::*;
