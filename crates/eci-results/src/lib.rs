pub mod aggregate;
pub mod config;
mod parser;
pub mod report;
pub mod scraper;
pub mod snapshot;
pub mod types;
pub mod utils;

pub use aggregate::Aggregator;
pub use parser::{ConstituencyPage, ParseError, parse_constituency_page};
pub use report::ReportRenderer;
pub use scraper::{ScraperError, WebScraper};

pub(crate) const BASE_URL: &str = "https://results.eci.gov.in/ResultAcGenFeb2025";
