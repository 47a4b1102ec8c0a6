use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::models::Document;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a document from its JSON form.
///
/// Line text is normalised on the way in and lines whose formatting spans
/// overlap, run past the text or are out of order are rejected.
pub fn parse_document(json: &str) -> Result<Document, IoError> {
    Ok(serde_json::from_str(json)?)
}

/// Render a document as pretty-printed JSON.
pub fn document_to_json(document: &Document) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Read a JSON document from disk
pub fn read_document(path: &Path) -> Result<Document, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path)?;
    let document = parse_document(&json)?;
    debug!("read {} blocks from {}", document.len(), path.display());
    Ok(document)
}

/// Write a document to disk as JSON
pub fn write_document(path: &Path, document: &Document) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, document_to_json(document)?)?;
    debug!("wrote {} blocks to {}", document.len(), path.display());
    Ok(())
}
