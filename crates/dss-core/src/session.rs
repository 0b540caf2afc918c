use reqwest::blocking::{Client, ClientBuilder, Response};

use crate::config::Settings;
use crate::error::{Result, ScrapeError};

/// A fetched document, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Final URL, after redirects
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Stateful HTTP capability a scraper calls through.
///
/// Unsuccessful statuses are not errors at this level, scrapers decide what a
/// missing page means. Transport failures are reported as
/// [`ScrapeError::Connectivity`].
pub trait Session {
    fn get(&self, url: &str) -> Result<Page>;

    /// Url-encoded form submission, for sites that need a login before
    /// their pages can be fetched.
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Page>;
}

/// Blocking `reqwest` session keeping cookies between requests.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(&settings.user_agent)
            .cookie_store(true)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(ScrapeError::HttpClient)?;
        Ok(Self { client })
    }
}

impl Session for HttpSession {
    fn get(&self, url: &str) -> Result<Page> {
        read_page(url, self.client.get(url).send())
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Page> {
        read_page(url, self.client.post(url).form(form).send())
    }
}

fn read_page(url: &str, resp: reqwest::Result<Response>) -> Result<Page> {
    let resp = resp.map_err(|e| ScrapeError::connectivity(url, e))?;
    let status = resp.status().as_u16();
    let final_url = resp.url().to_string();
    let body = resp.text().map_err(|e| ScrapeError::connectivity(url, e))?;
    Ok(Page {
        url: final_url,
        status,
        body,
    })
}
