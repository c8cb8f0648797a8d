use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::document::Document;
use crate::{Error, Result};

/// One row of the snippet table. Only `text` is required.
#[derive(Debug, Deserialize)]
struct SnippetRow {
    text: String,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    page: Option<String>,
}

/// Load documents from a CSV file with a `text` column and optional
/// `year` and `page` columns.
///
/// Rows whose text is blank are dropped so that every loaded document has
/// something to embed.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::Load(format!("cannot open {}: {e}", path.display())))?;
    let documents = read_csv(file)?;
    tracing::info!(path = %path.display(), count = documents.len(), "loaded documents");
    Ok(documents)
}

/// Read documents from any CSV source. See [`load_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Document>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut documents = Vec::new();
    let mut skipped = 0usize;
    for (row_number, row) in reader.deserialize::<SnippetRow>().enumerate() {
        let row = row.map_err(|e| Error::Load(format!("row {}: {e}", row_number + 1)))?;
        if row.text.trim().is_empty() {
            skipped += 1;
            continue;
        }
        documents.push(Document {
            content: row.text,
            year: non_empty(row.year),
            page: non_empty(row.page),
        });
    }

    if skipped > 0 {
        tracing::warn!(skipped, "dropped rows with blank text");
    }
    Ok(documents)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
