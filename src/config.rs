use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        google_api_key: get_env_opt("GOOGLE_API_KEY"),
        google_search_engine_id: get_env_opt("GOOGLE_SEARCH_ENGINE_ID"),
        search_endpoint: get_env_or_default("DEMO_PREP_SEARCH_ENDPOINT", DEFAULT_SEARCH_ENDPOINT),
        request_timeout: Duration::from_secs(get_env_parsed("DEMO_PREP_REQUEST_TIMEOUT_SECS", 10)),
        max_vendor_checks: get_env_parsed("DEMO_PREP_MAX_VENDOR_CHECKS", 20),
        output_dir: get_env_or_default("DEMO_PREP_OUTPUT_DIR", "web_outputs"),
        bind_addr: get_env_or_default("DEMO_PREP_BIND_ADDR", "0.0.0.0:5001"),
        session_ttl: Duration::from_secs(get_env_parsed("DEMO_PREP_SESSION_TTL_SECS", 30 * 60)),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub search_endpoint: String,
    /// Applied to every outbound web call (search and homepage fetch).
    pub request_timeout: Duration,
    pub max_vendor_checks: usize,
    pub output_dir: String,
    pub bind_addr: String,
    /// How long an unconfirmed web research session is kept.
    pub session_ttl: Duration,
}

impl Config {
    pub fn search_enabled(&self) -> bool {
        self.google_api_key.is_some() && self.google_search_engine_id.is_some()
    }
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("ignoring unparsable {key}={raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}
