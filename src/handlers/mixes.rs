use super::common::{created_response, success_response, PaginationParams};
use super::AppState;
use crate::errors::ServiceError;
use crate::services::materials::CreateMixRequest;
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

/// Create a mix, consuming material balances atomically
#[utoipa::path(
    post,
    path = "/api/v1/mixes",
    request_body = CreateMixRequest,
    responses(
        (status = 201, description = "Mix created"),
        (status = 422, description = "Insufficient inventory", body = crate::errors::ErrorResponse)
    ),
    tag = "materials"
)]
pub async fn create_mix(
    State(state): State<AppState>,
    Json(request): Json<CreateMixRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mix = state.services.materials.create_mix(request).await?;
    Ok(created_response(mix))
}

async fn get_mix(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let mix = state
        .services
        .materials
        .get_mix(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Mix {} not found", id)))?;
    Ok(success_response(mix))
}

async fn list_mixes(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let mixes = state
        .services
        .materials
        .list_mixes(params.page, params.per_page)
        .await?;
    Ok(success_response(mixes))
}

pub fn mix_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_mix))
        .route("/", get(list_mixes))
        .route("/:id", get(get_mix))
}
