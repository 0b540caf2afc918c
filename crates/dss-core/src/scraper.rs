use std::path::PathBuf;
use std::time::Duration;

use crate::config::Settings;
use crate::error::{Result, ScrapeError};
use crate::output::{OutputCapabilities, OutputWriter, Payload};
use crate::session::{HttpSession, Page, Session};
use crate::throttle::Throttle;

/// Site specific extraction logic.
///
/// A scrape fetches one or more pages for `target` and appends what it
/// extracts to the scraper's store. Rows appended before a failure are kept.
pub trait Scrapable {
    type Target: ?Sized;

    fn scrape(&mut self, target: &Self::Target) -> Result<()>;
}

/// State shared by every scraper: session, throttle, logging target and
/// output capabilities.
#[derive(Debug)]
pub struct ScraperBase<S = HttpSession> {
    log_target: String,
    base_url: String,
    session: S,
    throttle: Throttle,
    output: OutputWriter,
}

impl ScraperBase<HttpSession> {
    pub fn new(
        name: &str,
        base_url: &str,
        settings: &Settings,
        capabilities: OutputCapabilities,
    ) -> Result<Self> {
        let session = HttpSession::new(settings)?;
        Self::with_session(name, base_url, settings, capabilities, session)
    }
}

impl<S> ScraperBase<S>
where
    S: Session,
{
    pub fn with_session(
        name: &str,
        base_url: &str,
        settings: &Settings,
        capabilities: OutputCapabilities,
        session: S,
    ) -> Result<Self> {
        Ok(Self {
            log_target: format!("dss::{name}"),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            throttle: Throttle::new(settings.crawl_delay()),
            output: OutputWriter::new(settings, capabilities)?,
        })
    }

    /// Logging target of this scraper, `dss::<name>`.
    pub fn log_target(&self) -> &str {
        &self.log_target
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn output(&self) -> &OutputWriter {
        &self.output
    }

    pub fn crawl_delay(&self) -> Duration {
        self.throttle.delay()
    }

    pub fn set_crawl_delay(&mut self, delay: Duration) {
        self.throttle.set_delay(delay);
    }

    /// Pauses between two requests, returns the applied delay.
    pub fn throttle(&self) -> Duration {
        let target = self.log_target.as_str();
        log::trace!(target: target, "Sleeping {:?}", self.throttle.delay());
        self.throttle.pause()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn fetch(&self, url: &str) -> Result<Page> {
        log::debug!(target: self.log_target.as_str(), "GET {url}");
        let page = self.session.get(url)?;
        log::debug!(target: self.log_target.as_str(), "{url} answered {}", page.status);
        Ok(page)
    }

    /// Fetches the page describing `target`, which must exist.
    pub fn fetch_target(&self, target: &str, url: &str) -> Result<Page> {
        let page = self.fetch(url)?;
        if !page.is_success() {
            return Err(ScrapeError::TargetNotFound {
                target: target.to_string(),
                url: page.url,
                status: page.status,
            });
        }
        Ok(page)
    }

    /// Raw robots.txt of the site, empty if it can't be fetched.
    pub fn robots_txt(&self) -> String {
        log::info!(target: self.log_target.as_str(), "Extracting robots.txt");
        let url = self.url("robots.txt");
        match self.fetch(&url) {
            Ok(page) if page.is_success() => page.body,
            Ok(page) => {
                log::warn!(
                    target: self.log_target.as_str(),
                    "No robots.txt at {url}: status {}",
                    page.status
                );
                String::new()
            }
            Err(e) => {
                log::warn!(target: self.log_target.as_str(), "Couldn't fetch {url}: {e}");
                String::new()
            }
        }
    }

    pub fn write(&self, filename: &str, payload: Payload<'_>) -> Result<PathBuf> {
        self.output.write(filename, payload)
    }
}
