//! World Cup text snippets and their sources
//!
//! Documents are created in bulk at startup and never mutated afterwards.
//! Identity is the position within the loaded sequence, so the order in
//! which they are loaded is the order the embedding cache is aligned to.
//!
//! # Usage
//!
//! ```ignore
//! use cupchat_lib::document::load_csv;
//!
//! let documents = load_csv("chunked_worldcup_data.csv")?;
//! println!("{} snippets, first from {:?}", documents.len(), documents[0].year);
//! ```

use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A text snippet with its source metadata
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Document {
    /// The snippet text that gets embedded and handed to the model as context
    pub content: String,
    /// Tournament year the snippet is about, when the source carries one
    pub year: Option<String>,
    /// Source page the snippet was scraped from
    pub page: Option<String>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            year: None,
            page: None,
        }
    }

    /// Attach a tournament year.
    #[must_use]
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Attach a source page.
    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Returns `true` if the content is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Hex fingerprint of the trimmed content.
    ///
    /// Only used for display. Cache invalidation is by document count.
    pub fn fingerprint(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.content.trim().hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}

mod tabular;

pub use tabular::*;
