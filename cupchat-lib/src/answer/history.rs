use serde::{Deserialize, Serialize};

/// One finished question/answer turn
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

/// The turns of one conversation, oldest first.
///
/// Owned by a single session and passed into every turn explicitly. It only
/// grows, and the whole transcript goes into every prompt, so very long
/// sessions make for long prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct History {
    exchanges: Vec<Exchange>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished turn.
    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.exchanges.push(Exchange {
            question: question.into(),
            answer: answer.into(),
        });
    }

    #[must_use]
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// Numbered transcript ending with `query` as the next user turn.
    pub fn transcript(&self, query: &str) -> String {
        let mut text = String::new();
        for (i, exchange) in self.exchanges.iter().enumerate() {
            text.push_str(&format!(
                "{}. User: {}\n   Assistant: {}\n",
                i + 1,
                exchange.question,
                exchange.answer
            ));
        }
        text.push_str(&format!("{}. User: {query}", self.exchanges.len() + 1));
        text
    }
}

impl<Q: Into<String>, A: Into<String>> FromIterator<(Q, A)> for History {
    fn from_iter<I: IntoIterator<Item = (Q, A)>>(iter: I) -> Self {
        let mut history = Self::new();
        for (question, answer) in iter {
            history.push(question, answer);
        }
        history
    }
}
