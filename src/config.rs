//! Configuration handling for row codecs

/// Wire format for encoded rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Xml,
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xml" => Ok(Format::Xml),
            "json" => Ok(Format::Json),
            _ => Err(format!("Unknown row format: {}", s)),
        }
    }
}

/// Configuration for encoding and decoding rows
#[derive(Debug, Clone)]
pub struct Config {
    /// Wire format
    pub format: Format,
    /// Indent nested elements on output
    pub pretty: bool,
    /// Spaces per indentation level when `pretty` is set
    pub indent: usize,
    /// Write the schema version attribute on XML rows
    pub emit_version: bool,
    /// Reject unknown XML elements inside a row instead of skipping them
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: Format::default(),
            pretty: false,
            indent: 2,
            emit_version: true,
            strict: false,
        }
    }
}

impl Config {
    /// Create a new Config for a wire format
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    /// Set wire format
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Enable indented output
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set indentation width for pretty output
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Toggle the schema version attribute
    pub fn with_emit_version(mut self, emit: bool) -> Self {
        self.emit_version = emit;
        self
    }

    /// Enable strict decoding
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("XML".parse::<Format>(), Ok(Format::Xml));
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert!("yaml".parse::<Format>().is_err());
    }

    #[test]
    fn test_builder() {
        let config = Config::new(Format::Json).with_pretty(true).with_indent(4);
        assert_eq!(config.format, Format::Json);
        assert!(config.pretty);
        assert_eq!(config.indent, 4);
        assert!(config.emit_version);
        assert!(!config.strict);
    }
}
