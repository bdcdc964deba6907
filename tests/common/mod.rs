#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use demo_prep::data_models::SearchResult;
use demo_prep::error::SearchError;
use demo_prep::search::SearchClient;
use demo_prep::website::WebsiteScraper;

/// In-memory search backend: answers from a fixed query → results table and
/// records every query it sees.
#[derive(Clone)]
pub struct CannedSearch {
    responses: Arc<HashMap<String, Vec<SearchResult>>>,
    queries: Arc<Mutex<Vec<String>>>,
    enabled: bool,
    failing: bool,
}

impl CannedSearch {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(HashMap::new()),
            queries: Arc::new(Mutex::new(Vec::new())),
            enabled: true,
            failing: false,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Enabled, but every query errors.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub fn with_results(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        Arc::make_mut(&mut self.responses).insert(query.to_string(), results);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn count_queries_containing(&self, needle: &str) -> usize {
        self.queries().iter().filter(|q| q.contains(needle)).count()
    }
}

impl SearchClient for CannedSearch {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn search(&self, query: &str, num_results: u8) -> Result<Vec<SearchResult>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        if !self.enabled {
            return Err(SearchError::Disabled);
        }
        if self.failing {
            return Err(SearchError::Api {
                status: 500,
                message: "backend unavailable".to_string(),
            });
        }
        Ok(self
            .responses
            .get(query)
            .map(|results| results.iter().take(num_results as usize).cloned().collect())
            .unwrap_or_default())
    }
}

pub fn result(title: &str, link: &str, snippet: &str) -> SearchResult {
    SearchResult::new(title, link, snippet)
}

/// A scraper pointed at a closed local port, so the website phase fails fast.
pub fn unreachable_scraper() -> WebsiteScraper {
    WebsiteScraper::new(Duration::from_secs(2))
        .unwrap()
        .with_base_url("http://127.0.0.1:9")
}

/// Serves `html` as the homepage at `/`.
pub async fn mock_homepage(html: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    server
}
