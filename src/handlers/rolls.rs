use super::common::{
    created_response, default_page, default_per_page, no_content_response, success_response,
};
use super::AppState;
use crate::errors::ServiceError;
use crate::services::rolls::{CreateRollRequest, UpdateRollRequest};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RollListParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub job_order_id: Option<i32>,
}

async fn create_roll(
    State(state): State<AppState>,
    Json(request): Json<CreateRollRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let roll = state.services.rolls.create_roll(request).await?;
    Ok(created_response(roll))
}

async fn get_roll(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let roll = state
        .services
        .rolls
        .get_roll(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Roll {} not found", id)))?;
    Ok(success_response(roll))
}

async fn list_rolls(
    State(state): State<AppState>,
    Query(params): Query<RollListParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let rolls = state
        .services
        .rolls
        .list_rolls(params.page, params.per_page, params.job_order_id)
        .await?;
    Ok(success_response(rolls))
}

async fn update_roll(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateRollRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let roll = state.services.rolls.update_roll(id, request).await?;
    Ok(success_response(roll))
}

async fn delete_roll(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.rolls.delete_roll(id).await?;
    Ok(no_content_response())
}

/// Waste for a single roll: extruded minus cut, clamped at zero
#[utoipa::path(
    get,
    path = "/api/v1/rolls/{id}/waste",
    params(("id" = i32, Path, description = "Roll ID")),
    responses(
        (status = 200, description = "Roll waste", body = crate::services::production::RollWaste),
        (status = 404, description = "Roll not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn get_roll_waste(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let waste = state.services.production.roll_waste(id).await?;
    Ok(success_response(waste))
}

pub fn roll_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_roll))
        .route("/", get(list_rolls))
        .route("/:id", get(get_roll))
        .route("/:id", put(update_roll))
        .route("/:id", delete(delete_roll))
        .route("/:id/waste", get(get_roll_waste))
}
