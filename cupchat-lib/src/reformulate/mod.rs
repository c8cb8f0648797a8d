//! Query reformulation
//!
//! Asks the language model for paraphrases of the user's question, phrased
//! the way a football fan would ask it. Each paraphrase becomes an extra
//! query variant for fusion retrieval.
//!
//! Reformulation is best effort. A failed or unparseable reply yields no
//! paraphrases and retrieval carries on with the original question alone.

use crate::llm::{CompletionRequest, Generator};
use crate::{Error, Result};

const REWRITE_SYSTEM: &str = "You are a helpful assistant skilled at rewriting questions.";

/// Expands one question into up to `n` paraphrases.
pub struct QueryReformulator<G> {
    generator: G,
    temperature: f32,
}

impl<G: Generator> QueryReformulator<G> {
    pub fn new(generator: G, temperature: f32) -> Self {
        Self {
            generator,
            temperature,
        }
    }

    /// Paraphrases of `query`, or an empty list if the service fails.
    pub fn reformulate(&self, query: &str, n: usize) -> Vec<String> {
        match self.try_reformulate(query, n) {
            Ok(variants) => variants,
            Err(e) => {
                tracing::warn!(error = %e, "query reformulation failed, using original query only");
                Vec::new()
            }
        }
    }

    /// Paraphrases of `query`, with [`Error::ReformulationFailed`] on failure.
    ///
    /// The reply is used as-is: fewer than `n` usable lines is not an error.
    pub fn try_reformulate(&self, query: &str, n: usize) -> Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let prompt = rewrite_prompt(query, n);
        let reply = self
            .generator
            .complete(&CompletionRequest {
                system: REWRITE_SYSTEM,
                prompt: &prompt,
                temperature: self.temperature,
            })
            .map_err(|e| Error::ReformulationFailed(e.to_string()))?;

        let variants = parse_variants(&reply, n);
        tracing::debug!(?variants, "reformulated query");
        Ok(variants)
    }
}

fn rewrite_prompt(query: &str, n: usize) -> String {
    format!(
        "Rephrase the following question in {n} different ways from the perspective of a football fan asking about the FIFA World Cup. \
         Focus on football-related language, and keep the meaning the same. \
         List each rephrasing on a new line starting with a dash (-).\n\n\
         Original Question: {query}"
    )
}

/// One paraphrase per non-empty line, dash markers stripped, at most `n`.
fn parse_variants(reply: &str, n: usize) -> Vec<String> {
    reply
        .lines()
        .map(|line| line.trim_matches(|c: char| c == '-' || c.is_whitespace()))
        .filter(|line| !line.is_empty())
        .take(n)
        .map(str::to_string)
        .collect()
}
