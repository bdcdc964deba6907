use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::data_models::SearchResult;
use crate::error::SearchError;

/// The search API never returns more than this many results per request.
pub const MAX_RESULTS_PER_QUERY: u8 = 10;

/// A web search backend. Research phases only ever talk to this trait.
pub trait SearchClient: Send + Sync {
    /// False when credentials are missing; every search then fails with
    /// [`SearchError::Disabled`].
    fn is_enabled(&self) -> bool;

    fn search(
        &self,
        query: &str,
        num_results: u8,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;
}

#[derive(Debug, Clone)]
struct Credentials {
    api_key: String,
    search_engine_id: String,
}

/// Google Custom Search JSON API client.
#[derive(Debug, Clone)]
pub struct GoogleSearchClient {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleSearchClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        search_engine_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let credentials = match (api_key, search_engine_id) {
            (Some(api_key), Some(search_engine_id)) => Some(Credentials {
                api_key,
                search_engine_id,
            }),
            _ => None,
        };
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credentials,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        Self::new(
            config.search_endpoint.clone(),
            config.google_api_key.clone(),
            config.google_search_engine_id.clone(),
            config.request_timeout,
        )
    }
}

impl SearchClient for GoogleSearchClient {
    fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    async fn search(&self, query: &str, num_results: u8) -> Result<Vec<SearchResult>, SearchError> {
        let Some(credentials) = &self.credentials else {
            return Err(SearchError::Disabled);
        };
        let num = num_results.clamp(1, MAX_RESULTS_PER_QUERY).to_string();

        tracing::debug!(query, num = %num, "issuing search");
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", credentials.api_key.as_str()),
                ("cx", credentials.search_engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: SearchResponse = resp.json().await?;
        Ok(body
            .items
            .into_iter()
            .map(|item| SearchResult {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}
