use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Process-wide settings, read once when a scraper is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_output_folder")]
    pub output_folder: PathBuf,

    #[serde(default = "default_encoding")]
    pub encoding: String,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    #[serde(default = "default_quote_char")]
    pub quote_char: char,

    #[serde(default = "default_file_type")]
    pub default_file_type: OutputFormat,

    /// The delay in seconds between two requests of a same scrape
    #[serde(default = "default_crawl_delay")]
    pub crawl_delay: f64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            encoding: default_encoding(),
            delimiter: default_delimiter(),
            quote_char: default_quote_char(),
            default_file_type: default_file_type(),
            crawl_delay: default_crawl_delay(),
            user_agent: default_user_agent(),
        }
    }
}

impl Settings {
    /// Negative or non finite delays are treated as no delay at all.
    pub fn crawl_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.crawl_delay).unwrap_or(Duration::ZERO)
    }
}

fn default_output_folder() -> PathBuf {
    PathBuf::from("datasets")
}

fn default_encoding() -> String {
    String::from("utf-8")
}

fn default_delimiter() -> char {
    ','
}

fn default_quote_char() -> char {
    '"'
}

fn default_file_type() -> OutputFormat {
    OutputFormat::Tabular
}

fn default_crawl_delay() -> f64 {
    1.0
}

fn default_user_agent() -> String {
    String::from("dss-bot")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"crawlDelay": 0.5, "defaultFileType": "json"}"#).unwrap();
        assert_eq!(settings.crawl_delay(), Duration::from_millis(500));
        assert_eq!(settings.default_file_type, OutputFormat::StructuredText);
        assert_eq!(settings.output_folder, PathBuf::from("datasets"));
        assert_eq!(settings.delimiter, ',');
    }

    #[test]
    fn fractional_delay_is_exact() {
        let settings = Settings {
            crawl_delay: 0.05,
            ..Default::default()
        };
        assert_eq!(settings.crawl_delay(), Duration::from_millis(50));
    }

    #[test]
    fn invalid_delay_means_no_delay() {
        let settings = Settings {
            crawl_delay: -3.0,
            ..Default::default()
        };
        assert_eq!(settings.crawl_delay(), Duration::ZERO);
    }
}
