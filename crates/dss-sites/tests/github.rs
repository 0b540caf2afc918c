mod common;

use std::time::{Duration, Instant};

use common::{settings, FixtureSession};
use dss_sites::dss_core::{Scrapable, ScrapeError, Settings};
use dss_sites::ContributionsScraper;

const PROFILE: &str = include_str!("fixtures/github_profile.html");
const YEAR_2019: &str = include_str!("fixtures/github_2019.html");
const YEAR_2018: &str = include_str!("fixtures/github_2018.html");

const URL_2019: &str = "https://github.com/octocat?tab=overview&from=2019-12-01&to=2019-12-31";
const URL_2018: &str = "https://github.com/octocat?tab=overview&from=2018-12-01&to=2018-12-31";

fn octocat() -> FixtureSession {
    FixtureSession::default()
        .page("https://github.com/octocat", PROFILE)
        .page(URL_2019, YEAR_2019)
        .page(URL_2018, YEAR_2018)
}

#[test]
fn every_year_page_is_collected() {
    let dir = tempfile::tempdir().unwrap();
    let mut scraper = ContributionsScraper::with_session(&settings(&dir), octocat()).unwrap();

    scraper.scrape("octocat").unwrap();

    assert_eq!(
        scraper.data().base().session().requested(),
        ["https://github.com/octocat", URL_2019, URL_2018]
    );
    let rows = scraper.data().rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["Date"], "2019-12-30");
    assert_eq!(rows[0]["Commits"], 3);
    assert_eq!(rows[2]["Date"], "2018-12-31");
    assert_eq!(rows[2]["Commits"], 12);
}

#[test]
fn throttles_before_each_year_page() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        crawl_delay: 0.04,
        ..settings(&dir)
    };
    let mut scraper = ContributionsScraper::with_session(&settings, octocat()).unwrap();

    let started = Instant::now();
    scraper.scrape("octocat").unwrap();
    assert_eq!(scraper.data().base().session().requested().len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(80));
}

#[test]
fn profile_calendar_is_used_without_year_links() {
    let dir = tempfile::tempdir().unwrap();
    let session = FixtureSession::default().page("https://github.com/solo", YEAR_2018);
    let mut scraper = ContributionsScraper::with_session(&settings(&dir), session).unwrap();

    scraper.scrape("solo").unwrap();
    assert_eq!(scraper.data().len(), 1);
    assert_eq!(scraper.data().base().session().requested().len(), 1);
}

#[test]
fn unknown_user_is_target_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let session = FixtureSession::default().missing("https://github.com/ghost-user-404");
    let mut scraper = ContributionsScraper::with_session(&settings(&dir), session).unwrap();

    let err = scraper.scrape("ghost-user-404").unwrap_err();
    assert!(matches!(err, ScrapeError::TargetNotFound { .. }));
    assert!(scraper.data().is_empty());
}
