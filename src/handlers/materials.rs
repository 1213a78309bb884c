use super::common::{created_response, no_content_response, success_response, PaginationParams};
use super::AppState;
use crate::errors::ServiceError;
use crate::services::materials::{
    CreateMaterialInputRequest, CreateMaterialRequest, UpdateMaterialRequest,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};

async fn create_material(
    State(state): State<AppState>,
    Json(request): Json<CreateMaterialRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let material = state.services.materials.create_material(request).await?;
    Ok(created_response(material))
}

async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let material = state
        .services
        .materials
        .get_material(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Material {} not found", id)))?;
    Ok(success_response(material))
}

async fn list_materials(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let materials = state
        .services
        .materials
        .list_materials(params.page, params.per_page)
        .await?;
    Ok(success_response(materials))
}

async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateMaterialRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let material = state
        .services
        .materials
        .update_material(id, request)
        .await?;
    Ok(success_response(material))
}

async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.materials.delete_material(id).await?;
    Ok(no_content_response())
}

/// Record a material input, incrementing the ledger balance
#[utoipa::path(
    post,
    path = "/api/v1/materials/{id}/inputs",
    params(("id" = i32, Path, description = "Material ID")),
    request_body = CreateMaterialInputRequest,
    responses(
        (status = 201, description = "Input recorded"),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    tag = "materials"
)]
pub async fn create_material_input(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<CreateMaterialInputRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let input = state
        .services
        .materials
        .create_material_input(id, request)
        .await?;
    Ok(created_response(input))
}

async fn list_material_inputs(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let inputs = state.services.materials.list_material_inputs(id).await?;
    Ok(success_response(inputs))
}

/// Delete an input, restoring the ledger balance by the recorded amount
async fn delete_material_input(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.materials.delete_material_input(id).await?;
    Ok(no_content_response())
}

/// Materials below their low-stock threshold
async fn low_stock_materials(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let materials = state.services.materials.low_stock_materials().await?;
    Ok(success_response(materials))
}

pub fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_material))
        .route("/", get(list_materials))
        .route("/low-stock", get(low_stock_materials))
        .route("/:id", get(get_material))
        .route("/:id", put(update_material))
        .route("/:id", delete(delete_material))
        .route("/:id/inputs", post(create_material_input))
        .route("/:id/inputs", get(list_material_inputs))
}

pub fn material_input_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_material_input))
}
