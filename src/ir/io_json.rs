//! Flat JSON serialization of the internal document model.
//!
//! This is the editor's own save format:
//! `{ "spec": { "title", "description", "ifcVersion", "name" }, "applicability": [ { "id", "type", ... } ] }`.
//! It is the only lossless format; the namespaced JSON and XML grammars both
//! regroup rules by type.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::model::Document;
use crate::error::IdsError;

/// Reads a document from a flat JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_ids_json(path: &Path) -> Result<Document, IdsError> {
    let file = File::open(path).map_err(IdsError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| IdsError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a document to a flat JSON file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_ids_json(path: &Path, doc: &Document) -> Result<(), IdsError> {
    let file = File::create(path).map_err(IdsError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, doc).map_err(|source| IdsError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a document from a flat JSON string.
pub fn from_json_str(json: &str) -> Result<Document, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a document from flat JSON bytes.
pub fn from_json_slice(bytes: &[u8]) -> Result<Document, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes a document to a flat JSON string.
pub fn to_json_string(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}
