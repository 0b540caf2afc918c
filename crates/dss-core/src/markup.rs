use std::mem;
use std::path::PathBuf;

use crate::config::Settings;
use crate::error::Result;
use crate::output::{OutputCapabilities, Payload};
use crate::scraper::ScraperBase;
use crate::session::{HttpSession, Session};

/// Writes the markup held by a scraper.
pub trait MarkupWriter {
    fn write(&self, filename: &str) -> Result<PathBuf>;
}

/// Scraper holding a single raw markup payload, such as a whole page.
#[derive(Debug)]
pub struct MarkupScraper<S = HttpSession> {
    base: ScraperBase<S>,
    markup: String,
}

impl MarkupScraper<HttpSession> {
    pub fn new(name: &str, base_url: &str, settings: &Settings) -> Result<Self> {
        Self::with_session(name, base_url, settings, HttpSession::new(settings)?)
    }
}

impl<S> MarkupScraper<S>
where
    S: Session,
{
    pub fn with_session(name: &str, base_url: &str, settings: &Settings, session: S) -> Result<Self> {
        let base = ScraperBase::with_session(
            name,
            base_url,
            settings,
            OutputCapabilities::markup(),
            session,
        )?;
        Ok(Self {
            base,
            markup: String::new(),
        })
    }

    pub fn base(&self) -> &ScraperBase<S> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ScraperBase<S> {
        &mut self.base
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.markup = markup.into();
    }

    pub fn push_markup(&mut self, markup: &str) {
        self.markup.push_str(markup);
    }

    /// Hands the current payload over, leaving the scraper empty.
    pub fn take(&mut self) -> String {
        mem::take(&mut self.markup)
    }

    pub fn restore(&mut self, markup: String) {
        self.markup = markup;
    }
}

impl<S> MarkupWriter for MarkupScraper<S>
where
    S: Session,
{
    fn write(&self, filename: &str) -> Result<PathBuf> {
        self.base.write(filename, Payload::Markup(&self.markup))
    }
}
