// 🌐 REST API - read-only access to a linked catalog (axum)
//
// GET /api/health
// GET /api/stats
// GET /api/neos?name=Eros
// GET /api/neos/:designation
// GET /api/approaches?start_date=2020-01-01&distance_max=0.1&hazardous=true&limit=20

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::catalog::{ApproachRecord, Catalog, CatalogStats};
use crate::entities::NearEarthObject;
use crate::error::LookupError;
use crate::export::limit;
use crate::filters::{create_filters, FilterConfig};
use crate::temporal::datetime_to_str;

/// Default page size for /api/approaches
pub const DEFAULT_LIMIT: usize = 100;

/// Shared application state; the catalog is read-only, so no lock
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

// ============================================================================
// Response types
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NeoResponse {
    pub designation: String,
    pub name: Option<String>,
    pub diameter_km: Option<f64>,
    pub potentially_hazardous: bool,
    pub approach_count: usize,
}

impl From<&NearEarthObject> for NeoResponse {
    fn from(neo: &NearEarthObject) -> Self {
        Self {
            designation: neo.designation().to_string(),
            name: neo.name.clone(),
            diameter_km: neo.diameter,
            potentially_hazardous: neo.hazardous,
            approach_count: neo.approach_count(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApproachResponse {
    pub designation: String,
    pub datetime_utc: Option<String>,
    pub distance_au: f64,
    pub velocity_km_s: f64,
    pub neo: Option<NeoResponse>,
}

impl From<ApproachRecord<'_>> for ApproachResponse {
    fn from(record: ApproachRecord<'_>) -> Self {
        Self {
            designation: record.designation().to_string(),
            datetime_utc: record.approach.time.as_ref().map(datetime_to_str),
            distance_au: record.approach.distance,
            velocity_km_s: record.approach.velocity,
            neo: record.neo.map(NeoResponse::from),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NameParams {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

fn lookup_failure(err: LookupError) -> Response {
    warn!("{}", err);
    let status = if err.is_input_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(ApiResponse::<NeoResponse>::err(err.to_string()))).into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/stats - Catalog statistics
async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<CatalogStats>> {
    Json(ApiResponse::ok(state.catalog.stats()))
}

/// GET /api/neos/:designation - Lookup by primary designation
async fn get_neo(
    State(state): State<AppState>,
    Path(designation): Path<String>,
) -> Response {
    match state.catalog.find_by_designation(&designation) {
        Ok(neo) => (StatusCode::OK, Json(ApiResponse::ok(NeoResponse::from(neo)))).into_response(),
        Err(err) => lookup_failure(err),
    }
}

/// GET /api/neos?name= - Lookup by exact name
async fn get_neo_by_name(
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> Response {
    let name = params.name.unwrap_or_default();
    match state.catalog.find_by_name(&name) {
        Ok(neo) => (StatusCode::OK, Json(ApiResponse::ok(NeoResponse::from(neo)))).into_response(),
        Err(err) => lookup_failure(err),
    }
}

/// GET /api/approaches - Filtered close approaches
async fn get_approaches(
    State(state): State<AppState>,
    Query(config): Query<FilterConfig>,
    Query(page): Query<LimitParams>,
) -> Json<ApiResponse<Vec<ApproachResponse>>> {
    let filters = create_filters(&config);
    let n = page.limit.unwrap_or(DEFAULT_LIMIT);

    let results: Vec<ApproachResponse> = limit(state.catalog.query(&filters), Some(n))
        .map(ApproachResponse::from)
        .collect();

    Json(ApiResponse::ok(results))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(catalog: Arc<Catalog>) -> Router {
    let state = AppState { catalog };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/neos", get(get_neo_by_name))
        .route("/neos/:designation", get(get_neo))
        .route("/approaches", get(get_approaches))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
