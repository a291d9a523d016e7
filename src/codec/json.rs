//! JSON row format

use std::io::Write;

use tracing::trace;

use crate::error::Result;
use crate::model::Row;

use super::RowFormat;

/// JSON row format
pub struct JsonFormat {
    pretty: bool,
}

impl JsonFormat {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::compact()
    }
}

impl RowFormat for JsonFormat {
    fn encode(&self, row: &Row, writer: &mut dyn Write) -> Result<()> {
        trace!(cells = row.len(), pretty = self.pretty, "encoding row as json");
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, row)?;
        } else {
            serde_json::to_writer(&mut *writer, row)?;
        }
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Row> {
        let row: Row = serde_json::from_slice(bytes)?;
        trace!(cells = row.len(), "decoded json row");
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;

    #[test]
    fn test_wire_shape() {
        let row = Row::from_cells([Cell::from("a"), Cell::Int(1), Cell::Null])
            .with_property("unit", "kg")
            .with_original_index(3);
        let mut out = Vec::new();
        JsonFormat::compact().encode(&row, &mut out).unwrap();
        let json = String::from_utf8(out).unwrap();
        assert_eq!(
            json,
            r#"{"c":[{"t":"s","v":"a"},{"t":"i","v":1},{"t":"n"}],"p":{"unit":"kg"},"i":3}"#
        );
    }

    #[test]
    fn test_non_finite_floats_roundtrip() {
        let row = Row::from_cells([
            Cell::Float(f64::NAN),
            Cell::Float(f64::INFINITY),
            Cell::Float(f64::NEG_INFINITY),
            Cell::Float(-0.5),
        ]);
        let mut out = Vec::new();
        JsonFormat::compact().encode(&row, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out.clone()).unwrap(),
            r#"{"c":[{"t":"f","v":"NaN"},{"t":"f","v":"inf"},{"t":"f","v":"-inf"},{"t":"f","v":-0.5}]}"#
        );
        assert_eq!(JsonFormat::compact().decode(&out).unwrap(), row);
    }

    #[test]
    fn test_rejects_unknown_float_spelling() {
        let err = JsonFormat::compact()
            .decode(br#"{"c":[{"t":"f","v":"Infinity"}]}"#)
            .unwrap_err();
        assert!(matches!(err, crate::error::RowError::Json(_)));
    }

    #[test]
    fn test_empty_row_omits_optional_fields() {
        let mut out = Vec::new();
        JsonFormat::compact().encode(&Row::new(), &mut out).unwrap();
        assert_eq!(out, br#"{"c":[]}"#);

        let decoded = JsonFormat::compact().decode(b"{}").unwrap();
        assert!(decoded.is_empty());
        assert!(!decoded.has_original_index());
    }
}
