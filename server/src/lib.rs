use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use retrieval::persist::{load_index, IndexPaths};
use retrieval::{DocId, RankedResult, RankingConfig, SearchEngine};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

type HandlerError = (StatusCode, String);

pub fn build_app(index_dir: String, ranking: RankingConfig) -> Result<Router> {
    // Load every table at startup; nothing writes to them afterwards
    let index = load_index(&IndexPaths::new(&index_dir))?;
    let engine = SearchEngine::new(Arc::new(index), ranking);
    Ok(router(engine))
}

pub fn router(engine: SearchEngine) -> Router {
    let app_state = AppState { engine: Arc::new(engine) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/search_body", get(search_body_handler))
        .route("/search_title", get(search_title_handler))
        .route("/search_anchor", get(search_anchor_handler))
        .route("/get_pagerank", post(pagerank_handler))
        .route("/get_pageview", post(pageview_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run a ranking call on the blocking pool; body scans can be long.
async fn run_query<F>(state: &AppState, route: &'static str, query: String, rank: F) -> Result<Json<Vec<RankedResult>>, HandlerError>
where
    F: FnOnce(&SearchEngine, &str) -> Vec<RankedResult> + Send + 'static,
{
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let start = Instant::now();
    let engine = Arc::clone(&state.engine);
    let (query, results) = tokio::task::spawn_blocking(move || {
        let results = rank(engine.as_ref(), &query);
        (query, results)
    })
    .await
    .map_err(|e| {
        tracing::error!(route, error = %e, "query task failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "query failed".to_string())
    })?;
    tracing::info!(route, query = %query, hits = results.len(), took_s = start.elapsed().as_secs_f64(), "query served");
    Ok(Json(results))
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<Vec<RankedResult>>, HandlerError> {
    run_query(&state, "/search", params.query, |engine, q| engine.search(q)).await
}

pub async fn search_body_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<Vec<RankedResult>>, HandlerError> {
    run_query(&state, "/search_body", params.query, |engine, q| engine.search_body(q)).await
}

pub async fn search_title_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<Vec<RankedResult>>, HandlerError> {
    run_query(&state, "/search_title", params.query, |engine, q| engine.search_title(q)).await
}

pub async fn search_anchor_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<Vec<RankedResult>>, HandlerError> {
    run_query(&state, "/search_anchor", params.query, |engine, q| engine.search_anchor(q)).await
}

pub async fn pagerank_handler(State(state): State<AppState>, payload: Result<Json<Vec<DocId>>, JsonRejection>) -> Result<Json<Vec<f64>>, HandlerError> {
    let Json(ids) = payload.map_err(bad_request)?;
    Ok(Json(state.engine.page_ranks(&ids)))
}

pub async fn pageview_handler(State(state): State<AppState>, payload: Result<Json<Vec<DocId>>, JsonRejection>) -> Result<Json<Vec<u64>>, HandlerError> {
    let Json(ids) = payload.map_err(bad_request)?;
    Ok(Json(state.engine.page_views(&ids)))
}

fn bad_request(rejection: JsonRejection) -> HandlerError {
    tracing::debug!(error = %rejection, "rejected id payload");
    (StatusCode::BAD_REQUEST, format!("expected a JSON array of document ids: {}", rejection.body_text()))
}
