use std::error::Error as StdError;

use crate::output::OutputFormat;

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

/// Errors surfaced by scrapers and by the dataset writer.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The remote resource (user, topic, chart week...) does not exist.
    #[error("{target} not found: {url} answered with status {status}")]
    TargetNotFound {
        target: String,
        url: String,
        status: u16,
    },

    /// Transport level failure, never retried.
    #[error("Connection to {url} failed: {source}")]
    Connectivity {
        url: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Couldn't build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Expected markup is absent from a fetched page.
    #[error("Couldn't parse {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("Unknown feature `{feature}`, expected one of: {schema}")]
    UnknownFeature { feature: String, schema: String },

    #[error("Duplicate feature `{0}` in schema")]
    DuplicateFeature(String),

    #[error("At least one valid output format is required")]
    NoValidFormats,

    #[error("Cannot write {payload} as {format}")]
    IncompatibleFormat {
        format: OutputFormat,
        payload: &'static str,
    },

    #[error("Unknown output format `{0}`, expected csv, json or html")]
    UnknownFormat(String),

    #[error("Separator `{0}` must be a single ASCII character")]
    InvalidSeparator(char),

    #[error("Unknown encoding label `{0}`")]
    UnknownEncoding(String),

    #[error("Encoding {0} can be read but not written")]
    UnsupportedEncoding(&'static str),

    /// Written data holds a character the output encoding cannot represent.
    #[error("Character `{character}` cannot be encoded as {encoding}")]
    Unencodable {
        character: char,
        encoding: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    pub fn parse(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn connectivity<E>(url: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::Connectivity {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Whether the remote target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TargetNotFound { .. })
    }
}
