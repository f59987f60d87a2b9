use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use search_core::corpus::InputDoc;
use search_core::dedup::remove_duplicates;
use search_core::{
    DocId, DocumentStatus, ExecutionPolicy, SearchError, SearchIndex, MAX_RESULT_DOCUMENT_COUNT,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub q: String,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Deserialize)]
pub struct RemoveParams {
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// Required in `X-ADMIN-TOKEN` for mutating endpoints; unset disables them.
    pub admin_token: Option<String>,
    /// Comma-separated origins; unset or empty allows any.
    pub cors_allow_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
        }
    }
}

/// Readers (search, match, lookups) share the index; add/remove/dedup take it exclusively.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<RwLock<SearchIndex>>,
    pub admin_token: Option<String>,
}

pub fn build_app(index: SearchIndex, config: AppConfig) -> Router {
    let app_state = AppState {
        index: Arc::new(RwLock::new(index)),
        admin_token: config.admin_token,
    };

    let origins: Vec<_> = config
        .cors_allow_origin
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/match/:doc_id", get(match_handler))
        .route("/doc/:doc_id", get(doc_handler).delete(remove_handler))
        .route("/index/batch", post(index_batch))
        .route("/index/dedup", post(index_dedup))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<SearchResponse> {
    let start = std::time::Instant::now();
    let policy = ExecutionPolicy::from_parallel(params.parallel);
    let status = params.status.unwrap_or_default();
    let ranked = state
        .index
        .read()
        .rank_documents_with(policy, &params.q, status)
        .map_err(error_response)?;
    let total_hits = ranked.len();

    let results: Vec<SearchHit> = ranked
        .into_iter()
        .take(MAX_RESULT_DOCUMENT_COUNT)
        .map(|doc| SearchHit { doc_id: doc.id, relevance: doc.relevance, rating: doc.rating })
        .collect();
    Ok(Json(SearchResponse {
        query: params.q,
        took_s: start.elapsed().as_secs_f64(),
        total_hits,
        results,
    }))
}

pub async fn match_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
    Query(params): Query<MatchParams>,
) -> ApiResult<serde_json::Value> {
    let policy = ExecutionPolicy::from_parallel(params.parallel);
    let (words, status) = state
        .index
        .read()
        .match_document_with(policy, &params.q, doc_id)
        .map_err(error_response)?;
    Ok(Json(serde_json::json!({ "doc_id": doc_id, "words": words, "status": status })))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Json<serde_json::Value> {
    let index = state.index.read();
    Json(serde_json::json!({ "doc_id": doc_id, "words": index.word_frequencies(doc_id) }))
}

// --- Admin endpoints ---
async fn index_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(docs): Json<Vec<InputDoc>>,
) -> ApiResult<serde_json::Value> {
    authorize(&state, &headers)?;
    let mut index = state.index.write();
    for doc in &docs {
        index
            .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
            .map_err(error_response)?;
    }
    tracing::info!(added = docs.len(), total = index.document_count(), "batch indexed");
    Ok(Json(serde_json::json!({ "added": docs.len(), "total": index.document_count() })))
}

async fn remove_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(doc_id): Path<DocId>,
    Query(params): Query<RemoveParams>,
) -> ApiResult<serde_json::Value> {
    authorize(&state, &headers)?;
    let mut index = state.index.write();
    let removed = index.contains(doc_id);
    index.remove_document_with(ExecutionPolicy::from_parallel(params.parallel), doc_id);
    Ok(Json(serde_json::json!({ "removed": removed, "total": index.document_count() })))
}

async fn index_dedup(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<serde_json::Value> {
    authorize(&state, &headers)?;
    let removed = remove_duplicates(&mut state.index.write());
    Ok(Json(serde_json::json!({ "removed": removed })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

fn error_response(err: SearchError) -> (StatusCode, String) {
    let status = match err {
        SearchError::InvalidId(_) | SearchError::InvalidText(_) | SearchError::InvalidQuery(_) => {
            StatusCode::BAD_REQUEST
        }
        SearchError::UnknownId(_) => StatusCode::NOT_FOUND,
        SearchError::DuplicateId(_) => StatusCode::CONFLICT,
    };
    (status, err.to_string())
}
