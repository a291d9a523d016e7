//! Error type shared by the row model and its codecs

use thiserror::Error;

/// Errors raised by row access and row encoding/decoding
#[derive(Debug, Error)]
pub enum RowError {
    #[error("cell index {index} out of bounds for row of {len} cells")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("expected <{expected}> element, found <{found}>")]
    UnexpectedElement { expected: &'static str, found: String },

    #[error("unknown element <{0}> inside row")]
    UnknownElement(String),

    #[error("unexpected text inside row: {0:?}")]
    UnexpectedText(String),

    #[error("no row element found")]
    MissingRow,

    #[error("input ended inside a row element")]
    UnexpectedEof,

    #[error("unsupported row schema version: {0}")]
    UnsupportedVersion(String),

    #[error("invalid original index: {0}")]
    InvalidOriginalIndex(String),

    #[error("unknown cell type tag: {0}")]
    UnknownCellType(String),

    #[error("invalid {tag} cell value: {value}")]
    InvalidCellValue { tag: &'static str, value: String },

    #[error("property element without key")]
    MissingPropertyKey,
}

pub type Result<T> = std::result::Result<T, RowError>;
