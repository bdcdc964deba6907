use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("web search disabled: set GOOGLE_API_KEY and GOOGLE_SEARCH_ENGINE_ID")]
    Disabled,

    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
}
