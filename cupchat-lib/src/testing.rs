//! Deterministic stand-ins for the embedding and generation services.

use std::sync::Mutex;

use crate::embed::{Embedder, Embedding};
use crate::llm::{CompletionRequest, Generator};
use crate::{Error, Result};

/// Embeds text as keyword presence counts: dimension `i` counts how often
/// `keywords[i]` occurs in the lowercased text.
pub struct KeywordEmbedder {
    keywords: Vec<&'static str>,
    pub document_calls: usize,
    pub query_calls: usize,
    pub fail_on: Option<&'static str>,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&'static str]) -> Self {
        Self {
            keywords: keywords.to_vec(),
            document_calls: 0,
            query_calls: 0,
            fail_on: None,
        }
    }

    pub fn vector(&self, text: &str) -> Embedding {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .map(|k| text.matches(k).count() as f32)
            .collect()
    }

    fn check(&self, text: &str) -> Result<()> {
        match self.fail_on {
            Some(needle) if text.contains(needle) => {
                Err(Error::Embedding(format!("refused to embed '{text}'")))
            }
            _ => Ok(()),
        }
    }
}

impl Embedder for KeywordEmbedder {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.document_calls += 1;
        texts
            .iter()
            .map(|t| {
                self.check(t)?;
                Ok(self.vector(t))
            })
            .collect()
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        self.query_calls += 1;
        self.check(text)?;
        Ok(self.vector(text))
    }

    fn dimension(&self) -> usize {
        self.keywords.len()
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

/// A recorded call to [`ScriptedGenerator`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Replies with canned text (or an error) and records every request.
///
/// Requests whose system instruction mentions rewriting get the
/// `rewrites` reply instead, when one is set.
pub struct ScriptedGenerator {
    reply: Option<String>,
    rewrites: Option<String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            rewrites: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            rewrites: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rewrites(mut self, rewrites: &str) -> Self {
        self.rewrites = Some(rewrites.to_string());
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Generator for ScriptedGenerator {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: request.system.to_string(),
            prompt: request.prompt.to_string(),
            temperature: request.temperature,
        });
        if request.system.contains("rewriting") {
            if let Some(rewrites) = &self.rewrites {
                return Ok(rewrites.clone());
            }
        }
        self.reply
            .clone()
            .ok_or_else(|| Error::Generation("service unavailable".into()))
    }

    fn model_name(&self) -> &str {
        "scripted-test"
    }
}
