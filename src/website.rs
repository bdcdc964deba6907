use std::time::Duration;

use scraper::{Html, Selector};

use crate::data_models::{WebsiteInfo, truncate_chars};
use crate::error::FetchError;

/// Keywords, in priority order, that mark an element as the "about" blurb.
pub const ABOUT_KEYWORDS: &[&str] = &["about", "what we do", "who we are"];
pub const ABOUT_MAX_CHARS: usize = 500;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Fetches a company homepage and pulls out its title, meta description and
/// about blurb.
#[derive(Debug, Clone)]
pub struct WebsiteScraper {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl WebsiteScraper {
    pub fn new(timeout: Duration) -> Result<WebsiteScraper, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(WebsiteScraper {
            client,
            base_url: None,
        })
    }

    /// Fetch every homepage from `base_url` instead of `https://<domain>`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> WebsiteScraper {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn homepage_url(&self, domain: &str) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{domain}"),
        }
    }

    pub async fn scrape(&self, domain: &str) -> Result<WebsiteInfo, FetchError> {
        let url = self.homepage_url(domain);
        log::info!("fetching homepage: {url}");
        let html = self.fetch_page(&url).await.inspect_err(|e| {
            log::error!("error fetching page {url}, error: {e:#}");
        })?;
        Ok(parse_homepage(&html))
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let url = reqwest::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let res = self.client.get(url).send().await?;
        if !res.status().is_success() {
            return Err(FetchError::Status(res.status().as_u16()));
        }
        let body = res.text().await?;
        Ok(body)
    }
}

/// Kept synchronous: `Html` is not `Send` and must not live across an await.
pub fn parse_homepage(html: &str) -> WebsiteInfo {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").unwrap();
    let description_selector = Selector::parse(r#"meta[name="description"]"#).unwrap();
    let block_selector = Selector::parse("p, div").unwrap();

    let title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let description = document
        .select(&description_selector)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let about = ABOUT_KEYWORDS.iter().find_map(|keyword| {
        document.select(&block_selector).find_map(|el| {
            let text = el.text().collect::<String>();
            if text.to_lowercase().contains(keyword) {
                let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                Some(truncate_chars(&collapsed, ABOUT_MAX_CHARS))
            } else {
                None
            }
        })
    });

    WebsiteInfo {
        title,
        description,
        about,
    }
}
