use super::common::{created_response, default_page, default_per_page, success_response};
use super::AppState;
use crate::errors::ServiceError;
use crate::services::maintenance::ReportMaintenanceRequest;
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MaintenanceListParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub machine_id: Option<i32>,
}

async fn report_issue(
    State(state): State<AppState>,
    Json(request): Json<ReportMaintenanceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.maintenance.report_issue(request).await?;
    Ok(created_response(record))
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state
        .services
        .maintenance
        .get_record(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Maintenance record {} not found", id)))?;
    Ok(success_response(record))
}

async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<MaintenanceListParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let records = state
        .services
        .maintenance
        .list_records(params.page, params.per_page, params.machine_id)
        .await?;
    Ok(success_response(records))
}

async fn resolve_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.maintenance.resolve_record(id).await?;
    Ok(success_response(record))
}

pub fn maintenance_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(report_issue))
        .route("/", get(list_records))
        .route("/:id", get(get_record))
        .route("/:id/resolve", put(resolve_record))
}
