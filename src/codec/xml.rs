//! XML row format

use std::borrow::Cow;
use std::io::Write;

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{Result, RowError};
use crate::model::{Cell, Row};

use super::{tags, RowFormat, SCHEMA_VERSION};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// XML row format
pub struct XmlFormat {
    config: Config,
}

impl XmlFormat {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Default for XmlFormat {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl RowFormat for XmlFormat {
    fn encode(&self, row: &Row, out: &mut dyn Write) -> Result<()> {
        trace!(cells = row.len(), properties = row.property_count(), "encoding row as xml");
        let mut writer = if self.config.pretty {
            Writer::new_with_indent(out, b' ', self.config.indent)
        } else {
            Writer::new(out)
        };

        let mut start = BytesStart::new(tags::ROW);
        if self.config.emit_version {
            start.push_attribute((tags::VERSION_ATTR, SCHEMA_VERSION));
        }
        let index = row.original_index_opt().map(|i| i.to_string());
        if let Some(index) = index.as_deref() {
            start.push_attribute((tags::ORIGINAL_INDEX_ATTR, index));
        }

        if row.is_empty() && row.property_count() == 0 {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;

        for cell in row {
            let mut elem = BytesStart::new(tags::CELL);
            elem.push_attribute((tags::CELL_TYPE_ATTR, cell.type_tag()));
            let text = cell_text(cell);
            write_text_element(&mut writer, elem, tags::CELL, text.as_deref().unwrap_or(""))?;
        }

        for (key, value) in row.properties() {
            let mut elem = BytesStart::new(tags::PROPERTY);
            elem.push_attribute((tags::PROPERTY_KEY_ATTR, key));
            write_text_element(&mut writer, elem, tags::PROPERTY, value)?;
        }

        writer.write_event(Event::End(BytesEnd::new(tags::ROW)))?;
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Row> {
        let mut reader = Reader::from_reader(bytes);
        // Cell text is significant, including surrounding whitespace.
        reader.config_mut().trim_text(false);

        let mut decoder = RowDecoder::new(self.config.strict);
        let mut buf = Vec::new();

        while !decoder.done {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,
                event if decoder.skip_depth > 0 => match event {
                    Event::Start(_) => decoder.skip_depth += 1,
                    Event::End(_) => decoder.skip_depth -= 1,
                    _ => {}
                },
                Event::Start(e) => decoder.start(&e, false)?,
                Event::Empty(e) => decoder.start(&e, true)?,
                Event::End(e) => decoder.end(e.local_name().as_ref())?,
                Event::Text(e) => decoder.push_text(&e.unescape()?)?,
                Event::CData(e) => decoder.push_text(std::str::from_utf8(&e)?)?,
                _ => {}
            }
            buf.clear();
        }

        let row = decoder.finish()?;
        trace!(cells = row.len(), properties = row.property_count(), "decoded xml row");
        Ok(row)
    }
}

/// Child element whose text is being collected
enum Open {
    Cell(String),
    Property(String),
}

struct RowDecoder {
    strict: bool,
    row: Option<Row>,
    open: Option<Open>,
    text: String,
    skip_depth: usize,
    done: bool,
}

impl RowDecoder {
    fn new(strict: bool) -> Self {
        Self {
            strict,
            row: None,
            open: None,
            text: String::new(),
            skip_depth: 0,
            done: false,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, is_empty: bool) -> Result<()> {
        let local = e.local_name();
        let name = local.as_ref();

        let Some(row) = self.row.as_mut() else {
            if name != tags::ROW.as_bytes() {
                return Err(RowError::UnexpectedElement {
                    expected: tags::ROW,
                    found: String::from_utf8_lossy(name).into_owned(),
                });
            }
            self.row = Some(read_row_start(e)?);
            self.done = is_empty;
            return Ok(());
        };

        if self.open.is_none() && name == tags::CELL.as_bytes() {
            // An untyped cell is read as a string.
            let tag = attr_value(e, tags::CELL_TYPE_ATTR)?.unwrap_or_else(|| "s".to_string());
            if is_empty {
                row.add(parse_cell(&tag, "")?);
            } else {
                self.text.clear();
                self.open = Some(Open::Cell(tag));
            }
            return Ok(());
        }

        if self.open.is_none() && name == tags::PROPERTY.as_bytes() {
            let key = attr_value(e, tags::PROPERTY_KEY_ATTR)?.ok_or(RowError::MissingPropertyKey)?;
            if is_empty {
                row.set_property(key, String::new());
            } else {
                self.text.clear();
                self.open = Some(Open::Property(key));
            }
            return Ok(());
        }

        let found = String::from_utf8_lossy(name).into_owned();
        if self.strict {
            return Err(RowError::UnknownElement(found));
        }
        debug!(element = %found, "skipping unknown element inside row");
        if !is_empty {
            self.skip_depth = 1;
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) -> Result<()> {
        if self.open.is_some() {
            self.text.push_str(text);
            return Ok(());
        }
        // Indentation between children is always fine.
        if self.row.is_none() || text.trim().is_empty() {
            return Ok(());
        }
        if self.strict {
            return Err(RowError::UnexpectedText(text.trim().to_owned()));
        }
        debug!(text = text.trim(), "skipping text outside cells");
        Ok(())
    }

    fn end(&mut self, name: &[u8]) -> Result<()> {
        match self.open.take() {
            Some(Open::Cell(tag)) => {
                let cell = parse_cell(&tag, &self.text)?;
                if let Some(row) = self.row.as_mut() {
                    row.add(cell);
                }
            }
            Some(Open::Property(key)) => {
                let value = std::mem::take(&mut self.text);
                if let Some(row) = self.row.as_mut() {
                    row.set_property(key, value);
                }
            }
            None => {
                if name == tags::ROW.as_bytes() {
                    self.done = true;
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Row> {
        match self.row {
            None => Err(RowError::MissingRow),
            Some(_) if !self.done => Err(RowError::UnexpectedEof),
            Some(row) => Ok(row),
        }
    }
}

fn read_row_start(e: &BytesStart<'_>) -> Result<Row> {
    let mut row = Row::new();
    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            k if k == tags::VERSION_ATTR.as_bytes() => {
                if value != SCHEMA_VERSION {
                    return Err(RowError::UnsupportedVersion(value.into_owned()));
                }
            }
            k if k == tags::ORIGINAL_INDEX_ATTR.as_bytes() => {
                let index = value
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| RowError::InvalidOriginalIndex(value.to_string()))?;
                row.set_original_index(Some(index));
            }
            _ => {}
        }
    }
    Ok(row)
}

fn attr_value(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart<'_>,
    name: &str,
    text: &str,
) -> Result<()> {
    if text.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
    }
    Ok(())
}

/// Text content of a cell; `None` for null
fn cell_text(cell: &Cell) -> Option<Cow<'_, str>> {
    match cell {
        Cell::Null => None,
        Cell::Date(d) => Some(Cow::Owned(d.format(DATE_FORMAT).to_string())),
        Cell::DateTime(dt) => Some(Cow::Owned(dt.format(DATETIME_FORMAT).to_string())),
        other => Some(other.display()),
    }
}

fn parse_cell(tag: &str, text: &str) -> Result<Cell> {
    let invalid = |tag: &'static str| RowError::InvalidCellValue {
        tag,
        value: text.to_owned(),
    };
    match tag {
        "n" => Ok(Cell::Null),
        "b" => match text {
            "true" => Ok(Cell::Bool(true)),
            "false" => Ok(Cell::Bool(false)),
            _ => Err(invalid("b")),
        },
        "i" => text.parse().map(Cell::Int).map_err(|_| invalid("i")),
        "f" => text.parse().map(Cell::Float).map_err(|_| invalid("f")),
        "s" => Ok(Cell::from(text)),
        "d" => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Cell::Date)
            .map_err(|_| invalid("d")),
        "dt" => NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
            .map(Cell::DateTime)
            .map_err(|_| invalid("dt")),
        other => Err(RowError::UnknownCellType(other.to_owned())),
    }
}
