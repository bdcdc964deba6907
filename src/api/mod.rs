use axum::{
    Router,
    routing::{get, post},
};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::researcher::PendingResearch;
use crate::search::SearchClient;
use crate::vendor::VendorCatalog;
use crate::website::WebsiteScraper;

pub mod handlers;
pub mod models;

/// Unconfirmed sessions older than this are dropped on the next insert.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

pub struct Session<S> {
    pub pending: PendingResearch<S>,
    pub created: Instant,
}

impl<S> Session<S> {
    fn is_live(&self, ttl: Duration) -> bool {
        self.created.elapsed() < ttl
    }
}

/// Shared by every request. Each pending session is owned by the map until
/// `/api/continue` removes it or it outlives `session_ttl`.
pub struct AppState<S> {
    pub search: S,
    pub scraper: WebsiteScraper,
    pub catalog: VendorCatalog,
    pub output_dir: PathBuf,
    pub session_ttl: Duration,
    pub sessions: DashMap<String, Session<S>>,
}

impl<S> AppState<S> {
    pub fn new(
        search: S,
        scraper: WebsiteScraper,
        catalog: VendorCatalog,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            search,
            scraper,
            catalog,
            output_dir: output_dir.into(),
            session_ttl: DEFAULT_SESSION_TTL,
            sessions: DashMap::new(),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Evicts expired sessions, then stores `pending` under `id`.
    pub fn insert_session(&self, id: String, pending: PendingResearch<S>) {
        let ttl = self.session_ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.is_live(ttl));
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, "dropped expired research sessions");
        }
        self.sessions.insert(
            id,
            Session {
                pending,
                created: Instant::now(),
            },
        );
    }

    /// Removes the session, returning it only if it has not expired.
    pub fn take_session(&self, id: &str) -> Option<PendingResearch<S>> {
        let (_, session) = self.sessions.remove(id)?;
        session
            .is_live(self.session_ttl)
            .then_some(session.pending)
    }
}

pub fn create_router<S: SearchClient + Clone + 'static>(state: Arc<AppState<S>>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let downloads = ServeDir::new(&state.output_dir);

    Router::new()
        .route("/api/research", post(handlers::research_handler::<S>))
        .route("/api/continue", post(handlers::continue_handler::<S>))
        .route("/health", get(handlers::health_handler::<S>))
        .with_state(state)
        // Generated reports
        .nest_service("/api/download", downloads)
        .layer(cors)
}
