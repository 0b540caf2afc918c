//! Wikipedia infoboxes, one row per infobox entry.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use dss_core::{
    FeatureSchema, HttpSession, Page, Result, Row, Scrapable, ScrapeError, Session, Settings,
    TabularScraper, TabularWriter,
};
use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Class, Name, Predicate};

pub const BASE_URL: &str = "https://en.wikipedia.org";

pub const FEATURES: [&str; 3] = ["Topic", "Field", "Value"];

pub struct InfoboxScraper<S = HttpSession> {
    data: TabularScraper<S>,
}

impl InfoboxScraper<HttpSession> {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_session(settings, HttpSession::new(settings)?)
    }
}

impl<S> InfoboxScraper<S>
where
    S: Session,
{
    /// A single page is fetched per topic, no delay is needed.
    pub fn with_session(settings: &Settings, session: S) -> Result<Self> {
        let schema = FeatureSchema::new(FEATURES)?;
        let mut data =
            TabularScraper::with_session("infobox", BASE_URL, schema, settings, session)?;
        data.base_mut().set_crawl_delay(Duration::ZERO);
        Ok(Self { data })
    }

    pub fn data(&self) -> &TabularScraper<S> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut TabularScraper<S> {
        &mut self.data
    }
}

impl<S> Scrapable for InfoboxScraper<S>
where
    S: Session,
{
    type Target = str;

    fn scrape(&mut self, topic: &str) -> Result<()> {
        let started = Instant::now();
        let topic = topic.trim().replace(' ', "_");

        let base = self.data.base();
        let url = base.url(&format!("wiki/{topic}"));
        let page = base.fetch_target(&topic, &url)?;
        let rows = parse_infobox(&page, &topic)?;
        let entries = rows.len();
        self.data.append_rows(rows)?;

        log::info!(
            target: self.data.base().log_target(),
            "DONE scraping {entries} infobox entries on {topic} in {:.3}s",
            started.elapsed().as_secs_f32()
        );
        Ok(())
    }
}

impl<S> TabularWriter for InfoboxScraper<S>
where
    S: Session,
{
    fn write(&self, filename: &str) -> Result<PathBuf> {
        self.data.write(filename)
    }
}

/// Rows of the first infobox of `page`, citations stripped from values.
pub fn parse_infobox(page: &Page, topic: &str) -> Result<Vec<Row>> {
    let document = Document::from(page.body.as_str());

    let infobox = document
        .find(Name("table").and(Class("infobox")))
        .next()
        .ok_or_else(|| ScrapeError::parse(&page.url, "no infobox"))?;

    let mut rows = Vec::new();
    for entry in infobox.find(Name("tr")) {
        let Some(key) = entry.find(Name("th").and(Attr("scope", "row"))).next() else {
            continue;
        };
        let Some(value) = entry.find(Name("td")).next() else {
            continue;
        };

        let mut text = String::new();
        visible_text(&value, &mut text);

        let mut row = Row::new();
        row.insert("Topic".into(), topic.into());
        row.insert("Field".into(), key.text().trim().into());
        row.insert("Value".into(), text.trim().into());
        rows.push(row);
    }

    Ok(rows)
}

fn visible_text(node: &Node, out: &mut String) {
    for child in node.children() {
        if let Some(text) = child.as_text() {
            out.push_str(text);
        } else if child.is(Name("br")) {
            out.push(' ');
        } else if !child.is(Name("sup").and(Class("reference"))) {
            visible_text(&child, out);
        }
    }
}
