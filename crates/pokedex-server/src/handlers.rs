use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use pokedex_api::{ApiError, ListParams};
use pokedex_core::{PageEnvelope, PokemonProfile};
use serde::Serialize;

use crate::profile::ProfileError;
use crate::server::AppState;

/// Message returned when upstream data could not be assembled.
pub const FETCH_ERROR_MESSAGE: &str = "データ取得エラー";

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadyResponse {
    status: &'static str,
    indexed_names: usize,
    cache_entries: usize,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Always 200; `status` tells whether search is index-backed yet.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let status = if state.index.is_ready() {
        "ready"
    } else {
        "indexing"
    };
    (
        StatusCode::OK,
        Json(ReadyResponse {
            status,
            indexed_names: state.index.len(),
            cache_entries: state.cache.stats().entries,
        }),
    )
}

/// `OPTIONS` without a CORS preflight request; the CORS layer adds headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn list_pokemon(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageEnvelope>, ApiError> {
    let aggregator_cfg = &state.config.aggregator;
    let query = params.into_query(aggregator_cfg.default_limit, aggregator_cfg.max_limit)?;

    let envelope = state.aggregator.serve(&query).await.map_err(|e| {
        tracing::error!(
            page = query.page,
            limit = query.limit,
            error = %e,
            "Failed to assemble page"
        );
        ApiError::internal(FETCH_ERROR_MESSAGE)
    })?;
    Ok(Json(envelope))
}

pub async fn get_pokemon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PokemonProfile>, ApiError> {
    match state.profiles.profile(&id).await {
        Ok(profile) => Ok(Json(profile)),
        Err(ProfileError::NotFound(id)) => Err(ApiError::not_found(format!("pokemon not found: {id}"))),
        Err(ProfileError::Upstream(e)) => {
            tracing::error!(id = %id, error = %e, "Failed to assemble profile");
            Err(ApiError::internal(FETCH_ERROR_MESSAGE))
        }
    }
}
