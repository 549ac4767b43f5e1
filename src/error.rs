use std::path::PathBuf;
use thiserror::Error;

use crate::conversion::ConversionReport;

/// The main error type for idskit operations.
#[derive(Debug, Error)]
pub enum IdsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed XML; `message` is the parser's own error text.
    #[error("XML parse error: {message}")]
    XmlParse { message: String },

    /// Malformed JSON handed to the import boundary.
    #[error("JSON parse error: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialization error: {source}")]
    JsonSerialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse IDS JSON from {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write IDS JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed input that is not any format this crate reads.
    #[error("Unrecognized document structure: {message}")]
    StructureMismatch { message: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error(
        "Conversion from {} to {} would lose information ({} warning(s)); pass --allow-lossy to proceed",
        .report.from,
        .report.to,
        .report.warning_count()
    )]
    LossyConversion { report: Box<ConversionReport> },
}
