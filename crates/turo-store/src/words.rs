use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use turo_types::{WordList, WordPair};

/// Wire shape of the word document
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordDocument {
    normal_order: Vec<WordPair>,
    flipped_order: Vec<WordPair>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Orderings differ in length: {normal} normal vs {flipped} flipped")]
    LengthMismatch { normal: usize, flipped: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Load the word list document. Called exactly once at startup; a session
/// is never constructed without a successfully loaded list.
pub fn load_words(path: &Path) -> Result<WordList, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let document: WordDocument =
        serde_json::from_reader(reader).map_err(|e| LoadError::ParseError(e.to_string()))?;

    into_word_list(document)
}

fn into_word_list(document: WordDocument) -> Result<WordList, LoadError> {
    if document.normal_order.len() != document.flipped_order.len() {
        return Err(LoadError::LengthMismatch {
            normal: document.normal_order.len(),
            flipped: document.flipped_order.len(),
        });
    }

    Ok(WordList {
        normal_order: document.normal_order,
        flipped_order: document.flipped_order,
    })
}
