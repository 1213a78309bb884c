use super::common::{
    created_response, default_page, default_per_page, no_content_response, success_response,
};
use super::AppState;
use crate::errors::ServiceError;
use crate::services::machines::{CreateMachineRequest, UpdateMachineRequest};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MachineListParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub section: Option<String>,
}

async fn create_machine(
    State(state): State<AppState>,
    Json(request): Json<CreateMachineRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let machine = state.services.machines.create_machine(request).await?;
    Ok(created_response(machine))
}

async fn get_machine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let machine = state
        .services
        .machines
        .get_machine(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Machine {} not found", id)))?;
    Ok(success_response(machine))
}

async fn list_machines(
    State(state): State<AppState>,
    Query(params): Query<MachineListParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let machines = state
        .services
        .machines
        .list_machines(params.page, params.per_page, params.section)
        .await?;
    Ok(success_response(machines))
}

async fn update_machine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateMachineRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let machine = state.services.machines.update_machine(id, request).await?;
    Ok(success_response(machine))
}

async fn delete_machine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.machines.delete_machine(id).await?;
    Ok(no_content_response())
}

pub fn machine_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_machine))
        .route("/", get(list_machines))
        .route("/:id", get(get_machine))
        .route("/:id", put(update_machine))
        .route("/:id", delete(delete_machine))
}
