//! Billboard Hot 100 weekly charts.
//!
//! Charts are walked backward in time: the previous chart's date is only known
//! once the current chart page has been parsed.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{Datelike, Days, Local, NaiveDate};
use dss_core::serde_json::Value;
use dss_core::{
    FeatureSchema, HttpSession, Page, Result, Row, Scrapable, ScrapeError, Session, Settings,
    TabularScraper, TabularWriter,
};
use select::document::Document;
use select::node::Node;
use select::predicate::{Class, Name, Predicate};

pub const BASE_URL: &str = "https://www.billboard.com/charts/hot-100";

/// Columns of the Hot 100 dataset.
///
/// `Last Week` is null when the song was not charted the previous week.
pub const FEATURES: [&str; 7] = [
    "Position",
    "Title",
    "Artist",
    "Last Week",
    "Peak Position",
    "Weeks on Chart",
    "Chart Date",
];

/// Weeks to collect, from the most recent one (`max`, today by default) back
/// to `min`. The first Hot 100 was published on 1958-08-04.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartRange {
    pub min: NaiveDate,
    pub max: Option<NaiveDate>,
}

impl ChartRange {
    pub fn new(min: NaiveDate, max: Option<NaiveDate>) -> Self {
        Self { min, max }
    }

    /// Charts are dated on Saturdays, the walk starts at the Saturday
    /// following `max`.
    fn first_week(&self) -> NaiveDate {
        let max = self.max.unwrap_or_else(|| Local::now().date_naive());
        next_saturday(max)
    }
}

pub struct Hot100Scraper<S = HttpSession> {
    data: TabularScraper<S>,
    charts_fetched: usize,
}

impl Hot100Scraper<HttpSession> {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_session(settings, HttpSession::new(settings)?)
    }
}

impl<S> Hot100Scraper<S>
where
    S: Session,
{
    pub fn with_session(settings: &Settings, session: S) -> Result<Self> {
        let schema = FeatureSchema::new(FEATURES)?;
        let data = TabularScraper::with_session("hot100", BASE_URL, schema, settings, session)?;
        Ok(Self {
            data,
            charts_fetched: 0,
        })
    }

    pub fn data(&self) -> &TabularScraper<S> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut TabularScraper<S> {
        &mut self.data
    }

    pub fn charts_fetched(&self) -> usize {
        self.charts_fetched
    }

    fn scrape_week(&mut self, week: NaiveDate) -> Result<NaiveDate> {
        let label = week.format("%Y-%m-%d").to_string();
        let base = self.data.base();
        log::info!(target: base.log_target(), "Fetching chart for week of {label}");

        let url = base.url(&label);
        let page = base.fetch_target(&format!("Hot 100 chart of {label}"), &url)?;
        let (chart_date, rows) = parse_chart(&page)?;

        self.data.append_rows(rows)?;
        self.charts_fetched += 1;
        Ok(chart_date)
    }
}

impl<S> Scrapable for Hot100Scraper<S>
where
    S: Session,
{
    type Target = ChartRange;

    fn scrape(&mut self, range: &ChartRange) -> Result<()> {
        let started = Instant::now();
        let mut week = range.first_week();
        let mut fetched = 0;

        while week >= range.min {
            if fetched > 0 {
                self.data.base().throttle();
            }
            let chart_date = self.scrape_week(week)?;
            fetched += 1;

            // Not every chart week is based around Saturday
            let previous = chart_date - Days::new(7);
            week = if previous < week {
                previous
            } else {
                week - Days::new(7)
            };
        }

        log::info!(
            target: self.data.base().log_target(),
            "DONE: fetched {fetched} week(s) of Hot 100 data in {:.3}s",
            started.elapsed().as_secs_f32()
        );
        Ok(())
    }
}

impl<S> TabularWriter for Hot100Scraper<S>
where
    S: Session,
{
    fn write(&self, filename: &str) -> Result<PathBuf> {
        self.data.write(filename)
    }
}

/// Date of the chart and one row per charted song.
pub fn parse_chart(page: &Page) -> Result<(NaiveDate, Vec<Row>)> {
    let document = Document::from(page.body.as_str());

    let header = document
        .find(Name("button").and(Class("chart-detail-header__date-selector-button")))
        .next()
        .ok_or_else(|| ScrapeError::parse(&page.url, "missing chart date selector"))?;
    let header = header.text();
    let header = header.trim();
    let chart_date = NaiveDate::parse_from_str(header, "%B %d, %Y")
        .map_err(|e| ScrapeError::parse(&page.url, format!("bad chart date `{header}`: {e}")))?;
    let chart_label = chart_date.format("%m-%d-%Y").to_string();

    let mut rows = Vec::new();
    for song in document.find(Name("div").and(Class("chart-list-item"))) {
        let position = int_attr(&song, "data-rank", page)?;

        let mut row = Row::new();
        row.insert("Position".into(), position.into());
        row.insert("Title".into(), text_attr(&song, "data-title", page)?.into());
        row.insert("Artist".into(), text_attr(&song, "data-artist", page)?.into());

        match song
            .find(Name("div").and(Class("chart-list-item__stats")))
            .next()
        {
            // Debut on the chart
            None => {
                row.insert("Last Week".into(), Value::Null);
                row.insert("Peak Position".into(), position.into());
                row.insert("Weeks on Chart".into(), Value::from(1_i64));
            }
            Some(stats) => {
                let last_week = match stat(&stats, "chart-list-item__last-week", page)?.as_str() {
                    "-" => Value::Null,
                    n => parse_int(n, "last week", page)?.into(),
                };
                let peak = stat(&stats, "chart-list-item__weeks-at-one", page)?;
                let weeks = stat(&stats, "chart-list-item__weeks-on-chart", page)?;
                row.insert("Last Week".into(), last_week);
                row.insert(
                    "Peak Position".into(),
                    parse_int(&peak, "peak position", page)?.into(),
                );
                row.insert(
                    "Weeks on Chart".into(),
                    parse_int(&weeks, "weeks on chart", page)?.into(),
                );
            }
        }
        row.insert("Chart Date".into(), chart_label.clone().into());
        rows.push(row);
    }

    Ok((chart_date, rows))
}

fn next_saturday(date: NaiveDate) -> NaiveDate {
    let ahead = (12 - date.weekday().num_days_from_monday()) % 7;
    date + Days::new(u64::from(ahead))
}

fn text_attr(node: &Node, name: &str, page: &Page) -> Result<String> {
    node.attr(name)
        .map(|v| v.trim().to_string())
        .ok_or_else(|| ScrapeError::parse(&page.url, format!("chart entry without {name}")))
}

fn int_attr(node: &Node, name: &str, page: &Page) -> Result<i64> {
    parse_int(&text_attr(node, name, page)?, name, page)
}

fn stat(stats: &Node, class: &str, page: &Page) -> Result<String> {
    stats
        .find(Name("div").and(Class(class)))
        .next()
        .map(|n| n.text().trim().to_string())
        .ok_or_else(|| ScrapeError::parse(&page.url, format!("missing {class}")))
}

fn parse_int(text: &str, what: &str, page: &Page) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|_| ScrapeError::parse(&page.url, format!("bad {what} `{text}`")))
}
