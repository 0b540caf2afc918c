mod common;

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use common::{settings, FixtureSession};
use dss_sites::billboard::BASE_URL;
use dss_sites::dss_core::serde_json::Value;
use dss_sites::dss_core::{Scrapable, ScrapeError, Settings, TabularWriter};
use dss_sites::{ChartRange, Hot100Scraper};

const WEEK_17: &str = include_str!("fixtures/hot100_2019-08-17.html");
const WEEK_10: &str = include_str!("fixtures/hot100_2019-08-10.html");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn week_url(day: &str) -> String {
    format!("{BASE_URL}/{day}")
}

fn two_weeks() -> FixtureSession {
    FixtureSession::default()
        .page(&week_url("2019-08-17"), WEEK_17)
        .page(&week_url("2019-08-10"), WEEK_10)
}

#[test]
fn walks_charts_backward_until_min_date() {
    let dir = tempfile::tempdir().unwrap();
    let mut scraper = Hot100Scraper::with_session(&settings(&dir), two_weeks()).unwrap();

    // 2019-08-15 is a Thursday, the walk starts on Saturday the 17th
    let range = ChartRange::new(date(2019, 8, 10), Some(date(2019, 8, 15)));
    scraper.scrape(&range).unwrap();

    assert_eq!(scraper.charts_fetched(), 2);
    assert_eq!(
        scraper.data().base().session().requested(),
        [week_url("2019-08-17"), week_url("2019-08-10")]
    );

    let rows = scraper.data().rows();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["Title"], "Old Town Road");
    assert_eq!(rows[0]["Chart Date"], "08-17-2019");
    assert_eq!(rows[1]["Artist"], "Shawn Mendes & Camila Cabello");
    // debut
    assert_eq!(rows[2]["Title"], "Lover");
    assert_eq!(rows[2]["Last Week"], Value::Null);
    assert_eq!(rows[2]["Peak Position"], 3);
    assert_eq!(rows[2]["Weeks on Chart"], 1);
    // back on the chart after a gap
    assert_eq!(rows[4]["Chart Date"], "08-10-2019");
    assert_eq!(rows[4]["Last Week"], Value::Null);
    assert_eq!(rows[4]["Weeks on Chart"], 6);
}

#[test]
fn writes_hot100_csv() {
    let dir = tempfile::tempdir().unwrap();
    let mut scraper = Hot100Scraper::with_session(&settings(&dir), two_weeks()).unwrap();
    let range = ChartRange::new(date(2019, 8, 17), Some(date(2019, 8, 17)));
    scraper.scrape(&range).unwrap();

    let path = scraper.write("billboard_hot_100").unwrap();
    assert_eq!(path, dir.path().join("billboard_hot_100.csv"));

    let text = std::fs::read_to_string(path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Position,Title,Artist,Last Week,Peak Position,Weeks on Chart,Chart Date")
    );
    assert_eq!(
        lines.next(),
        Some("1,Old Town Road,Lil Nas X Featuring Billy Ray Cyrus,1,1,20,08-17-2019")
    );
    assert_eq!(
        lines.next(),
        Some("2,Senorita,Shawn Mendes & Camila Cabello,2,2,7,08-17-2019")
    );
    assert_eq!(lines.next(), Some("3,Lover,Taylor Swift,,3,1,08-17-2019"));
    assert_eq!(lines.next(), None);
}

#[test]
fn throttles_between_chart_pages() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        crawl_delay: 0.05,
        ..settings(&dir)
    };
    let mut scraper = Hot100Scraper::with_session(&settings, two_weeks()).unwrap();
    assert_eq!(
        scraper.data().base().crawl_delay(),
        Duration::from_millis(50)
    );

    let started = Instant::now();
    let range = ChartRange::new(date(2019, 8, 10), Some(date(2019, 8, 17)));
    scraper.scrape(&range).unwrap();
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn unknown_week_is_target_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let session = FixtureSession::default().missing(&week_url("1900-01-06"));
    let mut scraper = Hot100Scraper::with_session(&settings(&dir), session).unwrap();

    let range = ChartRange::new(date(1900, 1, 1), Some(date(1900, 1, 1)));
    let err = scraper.scrape(&range).unwrap_err();
    assert!(matches!(err, ScrapeError::TargetNotFound { status: 404, .. }));
    assert!(scraper.data().is_empty());
}

#[test]
fn connection_loss_keeps_earlier_weeks() {
    let dir = tempfile::tempdir().unwrap();
    let session = FixtureSession::default().page(&week_url("2019-08-17"), WEEK_17);
    let mut scraper = Hot100Scraper::with_session(&settings(&dir), session).unwrap();

    let range = ChartRange::new(date(2019, 8, 1), Some(date(2019, 8, 17)));
    let err = scraper.scrape(&range).unwrap_err();
    assert!(matches!(err, ScrapeError::Connectivity { .. }));
    assert_eq!(scraper.data().len(), 3);
}

#[test]
fn range_in_the_future_fetches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut scraper =
        Hot100Scraper::with_session(&settings(&dir), FixtureSession::default()).unwrap();
    let range = ChartRange::new(date(2019, 8, 25), Some(date(2019, 8, 15)));
    scraper.scrape(&range).unwrap();
    assert!(scraper.data().base().session().requested().is_empty());
    assert_eq!(scraper.charts_fetched(), 0);
}
