//! GitHub contribution calendars.

use std::path::PathBuf;

use dss_core::{
    FeatureSchema, HttpSession, Page, Result, Row, Scrapable, ScrapeError, Session, Settings,
    TabularScraper, TabularWriter,
};
use select::document::Document;
use select::predicate::{Attr, Class, Name, Predicate};

pub const BASE_URL: &str = "https://github.com";

pub const FEATURES: [&str; 2] = ["Date", "Commits"];

/// Daily contribution counts of a user, one page per year of activity.
pub struct ContributionsScraper<S = HttpSession> {
    data: TabularScraper<S>,
}

impl ContributionsScraper<HttpSession> {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_session(settings, HttpSession::new(settings)?)
    }
}

impl<S> ContributionsScraper<S>
where
    S: Session,
{
    pub fn with_session(settings: &Settings, session: S) -> Result<Self> {
        let schema = FeatureSchema::new(FEATURES)?;
        let data =
            TabularScraper::with_session("contributions", BASE_URL, schema, settings, session)?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &TabularScraper<S> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut TabularScraper<S> {
        &mut self.data
    }

    fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            self.data.base().url(href)
        }
    }
}

impl<S> Scrapable for ContributionsScraper<S>
where
    S: Session,
{
    type Target = str;

    fn scrape(&mut self, username: &str) -> Result<()> {
        let username = username.trim().trim_matches('/');
        let base = self.data.base();
        let profile = base.fetch_target(username, &base.url(username))?;

        let years = year_links(&profile);
        if years.is_empty() {
            let rows = parse_calendar(&profile)?;
            return self.data.append_rows(rows);
        }

        log::info!(
            target: base.log_target(),
            "{username} has {} year(s) of activity",
            years.len()
        );
        for href in years {
            self.data.base().throttle();
            let url = self.absolute(&href);
            let page = self.data.base().fetch_target(username, &url)?;
            let rows = parse_calendar(&page)?;
            self.data.append_rows(rows)?;
        }
        Ok(())
    }
}

impl<S> TabularWriter for ContributionsScraper<S>
where
    S: Session,
{
    fn write(&self, filename: &str) -> Result<PathBuf> {
        self.data.write(filename)
    }
}

/// Links to the yearly contribution pages listed on a profile.
pub fn year_links(page: &Page) -> Vec<String> {
    let document = Document::from(page.body.as_str());
    document
        .find(Class("js-year-link"))
        .filter_map(|node| {
            if node.is(Name("a")) {
                node.attr("href").map(String::from)
            } else {
                node.find(Name("a"))
                    .next()
                    .and_then(|a| a.attr("href"))
                    .map(String::from)
            }
        })
        .collect()
}

/// One row per calendar day.
pub fn parse_calendar(page: &Page) -> Result<Vec<Row>> {
    let document = Document::from(page.body.as_str());

    let mut rows = Vec::new();
    for day in document.find(Attr("data-date", ()).and(Attr("data-count", ()))) {
        let date = day.attr("data-date").unwrap_or_default();
        let count = day.attr("data-count").unwrap_or_default();
        let commits: i64 = count
            .trim()
            .parse()
            .map_err(|_| ScrapeError::parse(&page.url, format!("bad count `{count}` on {date}")))?;

        let mut row = Row::new();
        row.insert("Date".into(), date.into());
        row.insert("Commits".into(), commits.into());
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ScrapeError::parse(&page.url, "no contribution calendar"));
    }
    Ok(rows)
}
