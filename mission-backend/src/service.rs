///! HTTP surface over the launch and planet operations
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use mission_common::NewLaunch;

use crate::error::LaunchError;
use crate::model::launches::LaunchManager;
use crate::model::planets::PlanetManager;

const DEFAULT_PAGE_NUMBER: usize = 1;
const DEFAULT_PAGE_LIMIT: usize = 0;

/// Shared handles for all request handlers
#[derive(Clone)]
pub struct AppState {
    pub launches: Arc<LaunchManager>,
    pub planets: Arc<PlanetManager>,
}

/// `?page=&limit=` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Offset and limit derived from a page query; a limit of 0 means "all"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: usize,
    pub limit: Option<usize>,
}

impl Pagination {
    pub fn from_query(query: &PageQuery) -> Self {
        let page = query.page.unwrap_or(DEFAULT_PAGE_NUMBER).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        Self {
            skip: (page - 1).saturating_mul(limit),
            limit: (limit > 0).then_some(limit),
        }
    }
}

impl IntoResponse for LaunchError {
    fn into_response(self) -> Response {
        let status = match &self {
            LaunchError::NotFound(_) => StatusCode::NOT_FOUND,
            LaunchError::FlightNumbersExhausted(_) => StatusCode::CONFLICT,
            LaunchError::UpstreamFetchFailed(_) => StatusCode::BAD_GATEWAY,
            LaunchError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/planets", get(http_get_all_planets))
        .route(
            "/v1/launches",
            get(http_get_all_launches).post(http_add_new_launch),
        )
        .route("/v1/launches/{id}", delete(http_abort_launch))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn http_get_all_planets(State(state): State<AppState>) -> Result<Response, LaunchError> {
    let planets = state.planets.get_all_planets().await?;
    Ok(Json(planets).into_response())
}

async fn http_get_all_launches(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, LaunchError> {
    let pagination = Pagination::from_query(&query);
    debug!("Listing launches with {:?}", pagination);

    let launches = state
        .launches
        .get_all_launches(pagination.skip, pagination.limit)
        .await?;
    Ok(Json(launches).into_response())
}

async fn http_add_new_launch(
    State(state): State<AppState>,
    Json(request): Json<NewLaunch>,
) -> Result<Response, LaunchError> {
    let launch = state.launches.schedule_new_launch(request).await?;
    Ok((StatusCode::CREATED, Json(launch)).into_response())
}

async fn http_abort_launch(
    State(state): State<AppState>,
    Path(flight_number): Path<u32>,
) -> Result<Response, LaunchError> {
    if !state.launches.exists_launch_with_id(flight_number).await? {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Launch not found" })),
        )
            .into_response());
    }

    if !state.launches.abort_launch_with_id(flight_number).await? {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Launch not aborted" })),
        )
            .into_response());
    }

    Ok(Json(json!({ "ok": true })).into_response())
}
