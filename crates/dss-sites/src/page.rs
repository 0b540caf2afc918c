//! Raw page snapshots.

use std::path::PathBuf;

use dss_core::{HttpSession, MarkupScraper, MarkupWriter, Result, Scrapable, Session, Settings};

/// Keeps the full markup of the last page scraped on a site.
pub struct PageScraper<S = HttpSession> {
    data: MarkupScraper<S>,
}

impl PageScraper<HttpSession> {
    pub fn new(base_url: &str, settings: &Settings) -> Result<Self> {
        Self::with_session(base_url, settings, HttpSession::new(settings)?)
    }
}

impl<S> PageScraper<S>
where
    S: Session,
{
    pub fn with_session(base_url: &str, settings: &Settings, session: S) -> Result<Self> {
        let data = MarkupScraper::with_session("page", base_url, settings, session)?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &MarkupScraper<S> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut MarkupScraper<S> {
        &mut self.data
    }

    /// Scrapes `path` straight to `filename`, leaving the held markup as it
    /// was before the call.
    pub fn download(&mut self, path: &str, filename: &str) -> Result<PathBuf> {
        let previous = self.data.take();
        let written = self.scrape(path).and_then(|()| self.data.write(filename));
        self.data.restore(previous);
        written
    }
}

impl<S> Scrapable for PageScraper<S>
where
    S: Session,
{
    type Target = str;

    fn scrape(&mut self, path: &str) -> Result<()> {
        let base = self.data.base();
        let url = base.url(path);
        let page = base.fetch_target(path, &url)?;
        log::info!(
            target: base.log_target(),
            "Fetched {} bytes of markup from {}",
            page.body.len(),
            page.url
        );
        self.data.set_markup(page.body);
        Ok(())
    }
}

impl<S> MarkupWriter for PageScraper<S>
where
    S: Session,
{
    fn write(&self, filename: &str) -> Result<PathBuf> {
        self.data.write(filename)
    }
}
