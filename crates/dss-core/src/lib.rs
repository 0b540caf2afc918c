mod config;
mod error;
mod markup;
mod output;
mod scraper;
mod session;
mod tabular;
mod throttle;

pub use config::Settings;
pub use error::{Result, ScrapeError};
pub use markup::{MarkupScraper, MarkupWriter};
pub use output::{
    cell_text, resolve_filename, OutputCapabilities, OutputFormat, OutputWriter, Payload,
};
pub use scraper::{Scrapable, ScraperBase};
pub use session::{HttpSession, Page, Session};
pub use tabular::{Column, FeatureSchema, Row, Table, TabularScraper, TabularWriter};
pub use throttle::Throttle;

pub use serde_json;
