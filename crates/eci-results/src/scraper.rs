use crate::config::ScrapeConfig;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:136.0) Gecko/20100101 Firefox/136.0";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: StatusCode },
}

/// Fetches constituency pages over a single shared connection pool.
#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    base_url: String,
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

impl WebScraper {
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScraperError> {
        // Accept-Encoding is added by reqwest itself so it can decode the body.
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .default_headers(browser_headers())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn page_url(&self, index: u32) -> String {
        format!("{}/ConstituencywiseU05{}.htm", self.base_url, index)
    }

    /// One GET for the page at `index`. Any failure is logged and yields `None`.
    pub async fn fetch_page(&self, index: u32) -> Option<String> {
        let url = self.page_url(index);
        log::debug!("Fetching {}", url);

        match self.get_html(&url).await {
            Ok(html) => Some(html),
            Err(ScraperError::Status { url, status }) => {
                log::error!("Failed to fetch {} (HTTP {})", url, status.as_u16());
                None
            }
            Err(e) => {
                log::error!("Error fetching {}: {}", url, e);
                None
            }
        }
    }

    async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::debug!("HTTP error: {e:?}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScraperError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response
            .text()
            .await
            .inspect_err(|e| log::debug!("Decode error: {e:?}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_template() {
        let scraper = WebScraper::new(&ScrapeConfig::default()).expect("client should build");

        assert_eq!(
            scraper.page_url(1),
            "https://results.eci.gov.in/ResultAcGenFeb2025/ConstituencywiseU051.htm"
        );
        assert_eq!(
            scraper.page_url(70),
            "https://results.eci.gov.in/ResultAcGenFeb2025/ConstituencywiseU0570.htm"
        );
    }

    #[test]
    fn test_page_url_trims_trailing_slash() {
        let config = ScrapeConfig {
            base_url: "http://localhost:8080/results/".to_string(),
            ..Default::default()
        };
        let scraper = WebScraper::new(&config).expect("client should build");

        assert_eq!(
            scraper.page_url(12),
            "http://localhost:8080/results/ConstituencywiseU0512.htm"
        );
    }

    #[tokio::test]
    async fn test_fetch_page_unreachable_host_yields_none() {
        let config = ScrapeConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: std::time::Duration::from_secs(2),
            ..Default::default()
        };
        let scraper = WebScraper::new(&config).expect("client should build");

        assert!(scraper.fetch_page(1).await.is_none());
    }
}
