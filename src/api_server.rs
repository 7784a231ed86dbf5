// Axum API Server Module
//
// Purpose: serve the rendered itinerary page and act as its persistence
// collaborator (checkbox and open/close notifications).

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::formatters::{HtmlFormatter, HtmlOptions};
use crate::itinerary::{Document, DisclosureTree, NodeKey, StateStore, TreeBuilder};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub document: Arc<Document>,
    pub store: Arc<Mutex<StateStore>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Load the itinerary (and saved UI state, if configured) from disk.
    pub async fn from_config(config: ServerConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading itinerary from {}", config.itinerary_path.display());
        let json = tokio::fs::read_to_string(&config.itinerary_path)
            .await
            .with_context(|| {
                format!("Failed to read itinerary {}", config.itinerary_path.display())
            })?;
        let document = Document::from_json_str(&json)?;
        tracing::info!(
            "Loaded {} days, {} stops",
            document.days.len(),
            document.stop_count()
        );

        let store = match &config.state_path {
            Some(path) => {
                tracing::info!("Loading UI state from {}", path.display());
                StateStore::load(path)?
            }
            None => StateStore::new(),
        };

        Ok(Self::new(document, store, config))
    }

    pub fn new(document: Document, store: StateStore, config: ServerConfig) -> Self {
        Self {
            document: Arc::new(document),
            store: Arc::new(Mutex::new(store)),
            config: Arc::new(config),
        }
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, StateStore>, AppError> {
        self.store
            .lock()
            .map_err(|_| AppError::Internal("state store lock poisoned".to_string()))
    }

    /// Fresh tree for this request with the current UI state applied.
    fn current_tree(&self) -> Result<DisclosureTree, AppError> {
        let store = self.lock_store()?;
        Ok(TreeBuilder::new().with_state(&store).build(&self.document))
    }

    /// Apply one change through a freshly built tree, with the store as the
    /// persistence hooks. Unknown nodes leave the store untouched.
    ///
    /// The store is serialized under the lock and written after it is released.
    async fn record<F>(&self, change: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut DisclosureTree, &mut StateStore) -> Option<bool>,
    {
        let snapshot = {
            let mut store = self.lock_store()?;
            let mut tree = TreeBuilder::new().with_state(&store).build(&self.document);
            change(&mut tree, &mut *store).ok_or(AppError::NotFound)?;
            match &self.config.state_path {
                Some(_) => Some(
                    serde_json::to_string_pretty(&*store)
                        .map_err(|e| AppError::Internal(e.to_string()))?,
                ),
                None => None,
            }
        };

        if let (Some(json), Some(path)) = (snapshot, &self.config.state_path) {
            persist(json, path).await?;
        }
        Ok(())
    }
}

async fn persist(json: String, path: &Path) -> Result<(), AppError> {
    tokio::fs::write(path, json).await.map_err(|e| {
        tracing::warn!("Failed to save UI state to {}: {}", path.display(), e);
        AppError::Internal(format!("Failed to write state file {}: {}", path.display(), e))
    })
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(itinerary_page))
        .route("/api/itinerary", get(get_itinerary))
        .route("/api/stops/:id/done", post(set_stop_done))
        .route("/api/nodes/:key/open", post(set_node_open))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn itinerary_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let tree = state.current_tree()?;
    let options = HtmlOptions {
        title: state.config.page_title.clone(),
        map_zoom: state.config.map_zoom,
        maps: true,
        persistence_base: Some("/api".to_string()),
    };
    Ok(Html(HtmlFormatter::format(&tree, &options)))
}

async fn get_itinerary(State(state): State<AppState>) -> Result<Json<DisclosureTree>, AppError> {
    Ok(Json(state.current_tree()?))
}

#[derive(Debug, Deserialize)]
struct DoneChange {
    done: bool,
}

#[derive(Debug, Deserialize)]
struct OpenChange {
    open: bool,
}

async fn set_stop_done(
    State(state): State<AppState>,
    UrlPath(stop_id): UrlPath<String>,
    Json(change): Json<DoneChange>,
) -> Result<StatusCode, AppError> {
    tracing::debug!("Stop {} done = {}", stop_id, change.done);
    state
        .record(|tree, store| {
            let key = tree.stop_by_persistence_id(&stop_id)?.key.clone();
            tree.set_stop_done(&key, change.done, store)
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_node_open(
    State(state): State<AppState>,
    UrlPath(key): UrlPath<String>,
    Json(change): Json<OpenChange>,
) -> Result<StatusCode, AppError> {
    let key = NodeKey::from(key);
    tracing::debug!("Node {} open = {}", key, change.open);
    state
        .record(|tree, store| tree.set_open(&key, change.open, store))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum AppError {
    NotFound,
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "No such node in this itinerary".to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
