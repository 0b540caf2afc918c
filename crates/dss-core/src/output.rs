use std::borrow::Cow;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use encoding_rs::{EncoderResult, Encoding};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Settings;
use crate::error::{Result, ScrapeError};
use crate::tabular::{FeatureSchema, Row};

/// The kinds of files a scraper can produce, named after their extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Delimited text with a header row (`csv`)
    #[serde(rename = "csv")]
    Tabular,
    /// Indented JSON (`json`)
    #[serde(rename = "json")]
    StructuredText,
    /// Verbatim markup (`html`)
    #[serde(rename = "html")]
    RawMarkup,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Tabular => "csv",
            Self::StructuredText => "json",
            Self::RawMarkup => "html",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "csv" => Some(Self::Tabular),
            "json" => Some(Self::StructuredText),
            "html" => Some(Self::RawMarkup),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s).ok_or_else(|| ScrapeError::UnknownFormat(s.to_string()))
    }
}

/// The ordered set of formats a scraper variant accepts, the first one being
/// its own fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputCapabilities {
    valid: Vec<OutputFormat>,
}

impl OutputCapabilities {
    pub fn new<I>(valid: I) -> Result<Self>
    where
        I: IntoIterator<Item = OutputFormat>,
    {
        let mut formats: Vec<OutputFormat> = Vec::new();
        for format in valid {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            return Err(ScrapeError::NoValidFormats);
        }
        Ok(Self { valid: formats })
    }

    pub fn tabular() -> Self {
        Self {
            valid: vec![OutputFormat::Tabular, OutputFormat::StructuredText],
        }
    }

    pub fn markup() -> Self {
        Self {
            valid: vec![OutputFormat::RawMarkup],
        }
    }

    pub fn all() -> Self {
        Self {
            valid: vec![
                OutputFormat::Tabular,
                OutputFormat::StructuredText,
                OutputFormat::RawMarkup,
            ],
        }
    }

    pub fn valid_formats(&self) -> &[OutputFormat] {
        &self.valid
    }

    pub fn contains(&self, format: OutputFormat) -> bool {
        self.valid.contains(&format)
    }

    pub fn fallback(&self) -> OutputFormat {
        self.valid[0]
    }

    /// The process-wide default if this variant supports it, its own fallback
    /// otherwise.
    pub fn effective_default(&self, default: OutputFormat) -> OutputFormat {
        if self.contains(default) {
            default
        } else {
            self.fallback()
        }
    }

    fn match_extension(&self, ext: &str) -> Option<OutputFormat> {
        OutputFormat::from_extension(ext).filter(|format| self.contains(*format))
    }
}

/// Resolves a requested file name against the accepted formats.
///
/// A name whose last extension is an accepted format is kept as is, any other
/// name gets the effective default extension appended.
pub fn resolve_filename(
    filename: &str,
    capabilities: &OutputCapabilities,
    default: OutputFormat,
) -> (String, OutputFormat) {
    let requested = filename
        .rsplit_once('.')
        .and_then(|(_, ext)| capabilities.match_extension(ext));

    match requested {
        Some(format) => (filename.to_string(), format),
        None => {
            let format = capabilities.effective_default(default);
            (format!("{filename}.{}", format.extension()), format)
        }
    }
}

/// What a scraper hands over to the writer.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Rows {
        schema: &'a FeatureSchema,
        rows: &'a [Row],
    },
    Markup(&'a str),
}

impl Payload<'_> {
    fn describe(&self) -> &'static str {
        match self {
            Self::Rows { .. } => "rows",
            Self::Markup(_) => "markup",
        }
    }
}

/// Writes scraped data under the configured output folder.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    folder: PathBuf,
    encoding: &'static Encoding,
    delimiter: u8,
    quote: u8,
    default_format: OutputFormat,
    capabilities: OutputCapabilities,
}

impl OutputWriter {
    pub fn new(settings: &Settings, capabilities: OutputCapabilities) -> Result<Self> {
        let encoding = Encoding::for_label(settings.encoding.trim().as_bytes())
            .ok_or_else(|| ScrapeError::UnknownEncoding(settings.encoding.clone()))?;
        // utf-16 and replacement can only be decoded, encoding_rs writes them as utf-8
        if encoding.output_encoding() != encoding {
            return Err(ScrapeError::UnsupportedEncoding(encoding.name()));
        }

        Ok(Self {
            folder: settings.output_folder.clone(),
            encoding,
            delimiter: ascii_byte(settings.delimiter)?,
            quote: ascii_byte(settings.quote_char)?,
            default_format: settings.default_file_type,
            capabilities,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn capabilities(&self) -> &OutputCapabilities {
        &self.capabilities
    }

    pub fn effective_default(&self) -> OutputFormat {
        self.capabilities.effective_default(self.default_format)
    }

    /// Final path and format for `filename`, without touching the disk.
    pub fn resolve(&self, filename: &str) -> (PathBuf, OutputFormat) {
        let (name, format) = resolve_filename(filename, &self.capabilities, self.default_format);
        (self.folder.join(name), format)
    }

    /// Serializes `payload` into the resolved file, overwriting it, and
    /// returns its path.
    pub fn write(&self, filename: &str, payload: Payload<'_>) -> Result<PathBuf> {
        let (path, format) = self.resolve(filename);
        let text = self.serialize(format, payload)?;

        let bytes = self.encode(&text)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }
        fs_err::write(&path, bytes)?;

        log::info!("Wrote {} as {format} to {}", payload.describe(), path.display());
        Ok(path)
    }

    fn serialize(&self, format: OutputFormat, payload: Payload<'_>) -> Result<String> {
        match (format, payload) {
            (OutputFormat::Tabular, Payload::Rows { schema, rows }) => self.to_csv(schema, rows),
            (OutputFormat::StructuredText, Payload::Rows { schema, rows }) => {
                let records = rows
                    .iter()
                    .map(|row| Value::Object(ordered(schema, row)))
                    .collect::<Vec<_>>();
                Ok(serde_json::to_string_pretty(&records)?)
            }
            (OutputFormat::StructuredText, Payload::Markup(markup)) => {
                Ok(serde_json::to_string_pretty(markup)?)
            }
            (OutputFormat::RawMarkup, Payload::Markup(markup)) => Ok(markup.to_string()),
            (format, payload) => Err(ScrapeError::IncompatibleFormat {
                format,
                payload: payload.describe(),
            }),
        }
    }

    /// Encodes `text` with the configured encoding, failing on the first
    /// character it cannot represent.
    fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let mut encoder = self.encoding.new_encoder();
        let mut bytes = Vec::with_capacity(text.len());
        let mut remaining = text;
        loop {
            let (result, read) =
                encoder.encode_from_utf8_to_vec_without_replacement(remaining, &mut bytes, true);
            remaining = &remaining[read..];
            match result {
                EncoderResult::InputEmpty => return Ok(bytes),
                EncoderResult::OutputFull => bytes.reserve(remaining.len().max(16)),
                EncoderResult::Unmappable(character) => {
                    return Err(ScrapeError::Unencodable {
                        character,
                        encoding: self.encoding.name(),
                    })
                }
            }
        }
    }

    fn to_csv(&self, schema: &FeatureSchema, rows: &[Row]) -> Result<String> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(vec![]);

        wtr.write_record(schema.iter())?;
        for row in rows {
            for feature in schema.iter() {
                wtr.write_field(cell_text(row.get(feature)).as_bytes())?;
            }
            wtr.write_record(None::<&[u8]>)?;
        }

        let buf = wtr.into_inner().map_err(|e| e.into_error())?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }
}

/// Text of a single delimited cell, empty when the value is missing.
pub fn cell_text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
        Some(Value::Number(n)) => Cow::Owned(n.to_string()),
        Some(nested) => Cow::Owned(nested.to_string()),
    }
}

fn ordered(schema: &FeatureSchema, row: &Row) -> Row {
    schema
        .iter()
        .filter_map(|feature| row.get(feature).map(|v| (feature.to_string(), v.clone())))
        .collect()
}

fn ascii_byte(c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(ScrapeError::InvalidSeparator(c))
    }
}
