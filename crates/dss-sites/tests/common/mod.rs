#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use dss_sites::dss_core::{Page, Result, ScrapeError, Session, Settings};

/// Serves canned pages, any other URL behaves like a closed connection.
#[derive(Default)]
pub struct FixtureSession {
    pages: HashMap<String, Page>,
    requested: RefCell<Vec<String>>,
}

impl FixtureSession {
    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.into(), Page::new(url, 200, body));
        self
    }

    pub fn missing(mut self, url: &str) -> Self {
        self.pages.insert(url.into(), Page::new(url, 404, "Not Found"));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Session for FixtureSession {
    fn get(&self, url: &str) -> Result<Page> {
        self.requested.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::connectivity(url, "connection closed by peer"))
    }

    fn post_form(&self, url: &str, _form: &[(&str, &str)]) -> Result<Page> {
        self.get(url)
    }
}

pub fn settings(dir: &tempfile::TempDir) -> Settings {
    Settings {
        output_folder: dir.path().to_path_buf(),
        crawl_delay: 0.0,
        ..Default::default()
    }
}
