//! HTTP API over the catalog.
//!
//! The catalog is loaded once at startup and shared read-only. Each request
//! builds its own [`CatalogStore`] view from query parameters, so requests
//! never share or mutate filter state.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version and catalog size) |
//! | `GET`  | `/records?q=&model=&severity=` | Filtered records, sorted by code |
//! | `GET`  | `/records/{code}` | One record from the full catalog |
//! | `GET`  | `/facets` | Model and severity facets |
//! | `GET`  | `/resolve?fragment=` | Resolve a deep-link fragment |
//! | `GET`  | `/link/{code}` | Fragment and share URL for a record |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "severity must be 0, 1, 2 or 3" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::catalog::{Catalog, CatalogOrigin, CatalogStore};
use crate::config::Config;
use crate::deeplink::DeepLinkSync;
use crate::filter::SeverityFilter;
use crate::get::LinkResponse;
use crate::models::DtcRecord;
use crate::search::{build_criteria, FacetsResponse, SearchResponse};
use crate::source;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
    base_url: Arc<str>,
}

/// Load the catalog from the configured source and serve until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let catalog = source::load_from_config(config).await;
    let app = router(catalog, &config.server.base_url);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "DTC Explorer API listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router over an already-loaded catalog.
pub fn router(catalog: Catalog, base_url: &str) -> Router {
    let state = AppState {
        catalog: Arc::new(catalog),
        base_url: Arc::from(base_url),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/records", get(handle_records))
        .route("/records/{code}", get(handle_record))
        .route("/facets", get(handle_facets))
        .route("/resolve", get(handle_resolve))
        .route("/link/{code}", get(handle_link))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    records: usize,
    origin: CatalogOrigin,
    loaded_at: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        records: state.catalog.len(),
        origin: state.catalog.origin().clone(),
        loaded_at: state.catalog.loaded_at().to_rfc3339(),
    })
}

// ============ GET /records ============

#[derive(Debug, Default, Deserialize)]
struct RecordsQuery {
    q: Option<String>,
    model: Option<String>,
    severity: Option<String>,
}

/// `None` or an empty value mean any severity; anything else must be 0-3.
fn parse_severity(raw: Option<&str>) -> Result<SeverityFilter, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(SeverityFilter::Any),
        Some(s) => s
            .parse::<i64>()
            .ok()
            .and_then(SeverityFilter::from_number)
            .ok_or_else(|| bad_request("severity must be 0, 1, 2 or 3")),
    }
}

async fn handle_records(
    State(state): State<AppState>,
    Query(params): Query<RecordsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let severity = parse_severity(params.severity.as_deref())?;
    let criteria = build_criteria(params.q.as_deref(), params.model.as_deref(), severity);
    let store = CatalogStore::with_criteria(state.catalog.clone(), criteria);

    let body = serde_json::to_value(SearchResponse::from_store(&store))
        .map_err(|e| internal(e.to_string()))?;
    Ok(Json(body))
}

// ============ GET /records/{code} ============

async fn handle_record(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<DtcRecord>, AppError> {
    state
        .catalog
        .find_by_code(&code)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(format!("record not found: {}", code)))
}

// ============ GET /facets ============

async fn handle_facets(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let facets = FacetsResponse::new(state.catalog.facet_models());
    serde_json::to_value(facets)
        .map(Json)
        .map_err(|e| internal(e.to_string()))
}

// ============ GET /resolve ============

#[derive(Debug, Default, Deserialize)]
struct ResolveQuery {
    #[serde(default)]
    fragment: String,
}

#[derive(Serialize)]
struct ResolveResponse {
    selected: Option<DtcRecord>,
}

/// Unknown codes resolve to `{"selected": null}`, not an error.
async fn handle_resolve(
    State(state): State<AppState>,
    Query(params): Query<ResolveQuery>,
) -> Json<ResolveResponse> {
    let store = CatalogStore::new(state.catalog.clone());
    let mut sync = DeepLinkSync::new();
    let selected = sync.navigate(&params.fragment, &store).cloned();
    Json(ResolveResponse { selected })
}

// ============ GET /link/{code} ============

async fn handle_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let record = state
        .catalog
        .find_by_code(&code)
        .ok_or_else(|| not_found(format!("record not found: {}", code)))?;
    LinkResponse::new(&state.base_url, record)
        .map(Json)
        .map_err(|e| internal(e.to_string()))
}
