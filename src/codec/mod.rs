//! Encoding and decoding rows to their wire formats
//!
//! Rows map onto an explicit, versioned schema rather than a reflected
//! object tree. Schema version 1:
//!
//! ```text
//! <r v="1" i="5">            row; `i` holds the original index when set
//!   <c t="s">a</c>           cells in order, `t` names the value type
//!   <c t="n"/>               null cell
//!   <p k="unit">kg</p>       properties
//! </r>
//! ```
//!
//! JSON uses the same short names: `{"c": [{"t": "s", "v": "a"}], "p": {...}, "i": 5}`.

mod json;
mod xml;

use std::io::Write;

use crate::config::{Config, Format};
use crate::error::Result;
use crate::model::Row;

pub use json::JsonFormat;
pub use xml::XmlFormat;

/// Current row schema version
pub const SCHEMA_VERSION: &str = "1";

/// Wire names used by the row schema
pub mod tags {
    pub const ROW: &str = "r";
    pub const CELL: &str = "c";
    pub const PROPERTY: &str = "p";
    pub const VERSION_ATTR: &str = "v";
    pub const ORIGINAL_INDEX_ATTR: &str = "i";
    pub const CELL_TYPE_ATTR: &str = "t";
    pub const PROPERTY_KEY_ATTR: &str = "k";
}

/// Trait for row wire formats
pub trait RowFormat {
    /// Encode a row to a writer
    fn encode(&self, row: &Row, writer: &mut dyn Write) -> Result<()>;

    /// Decode a single row from bytes
    fn decode(&self, bytes: &[u8]) -> Result<Row>;
}

/// Factory for creating row formats
pub struct FormatFactory;

impl FormatFactory {
    /// Create a row format based on configuration
    pub fn create(config: &Config) -> Box<dyn RowFormat> {
        match config.format {
            Format::Xml => Box::new(XmlFormat::new(config.clone())),
            Format::Json => Box::new(JsonFormat::new(config.pretty)),
        }
    }
}

/// Encode a row into a byte buffer using the configured format
pub fn encode_to_vec(row: &Row, config: &Config) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    FormatFactory::create(config).encode(row, &mut out)?;
    Ok(out)
}

/// Decode a row using the configured format
pub fn decode_from_slice(bytes: &[u8], config: &Config) -> Result<Row> {
    FormatFactory::create(config).decode(bytes)
}

/// Encode a row as compact XML
pub fn to_xml_string(row: &Row) -> Result<String> {
    let bytes = encode_to_vec(row, &Config::new(Format::Xml))?;
    Ok(std::str::from_utf8(&bytes)?.to_owned())
}

/// Decode a row from XML, skipping unknown elements
pub fn from_xml_str(xml: &str) -> Result<Row> {
    XmlFormat::default().decode(xml.as_bytes())
}

/// Encode a row as compact JSON
pub fn to_json_string(row: &Row) -> Result<String> {
    Ok(serde_json::to_string(row)?)
}

/// Decode a row from JSON
pub fn from_json_str(json: &str) -> Result<Row> {
    Ok(serde_json::from_str(json)?)
}
