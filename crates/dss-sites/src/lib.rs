pub mod billboard;
pub mod github;
pub mod page;
pub mod wikipedia;

pub use billboard::{ChartRange, Hot100Scraper};
pub use github::ContributionsScraper;
pub use page::PageScraper;
pub use wikipedia::InfoboxScraper;

pub use dss_core;
