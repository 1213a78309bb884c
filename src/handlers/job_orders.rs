use super::common::{
    created_response, default_page, default_per_page, no_content_response, success_response,
};
use super::AppState;
use crate::errors::ServiceError;
use crate::services::job_orders::{CreateJobOrderRequest, UpdateJobOrderRequest};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct JobOrderListParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub order_id: Option<i32>,
}

async fn create_job_order(
    State(state): State<AppState>,
    Json(request): Json<CreateJobOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job_order = state.services.job_orders.create_job_order(request).await?;
    Ok(created_response(job_order))
}

async fn get_job_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let job_order = state
        .services
        .job_orders
        .get_job_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Job order {} not found", id)))?;
    Ok(success_response(job_order))
}

async fn list_job_orders(
    State(state): State<AppState>,
    Query(params): Query<JobOrderListParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let job_orders = state
        .services
        .job_orders
        .list_job_orders(params.page, params.per_page, params.order_id)
        .await?;
    Ok(success_response(job_orders))
}

async fn update_job_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateJobOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job_order = state
        .services
        .job_orders
        .update_job_order(id, request)
        .await?;
    Ok(success_response(job_order))
}

async fn delete_job_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.job_orders.delete_job_order(id).await?;
    Ok(no_content_response())
}

/// Current produced/waste totals for a job order
#[utoipa::path(
    get,
    path = "/api/v1/job-orders/{id}/waste",
    params(("id" = i32, Path, description = "Job order ID")),
    responses(
        (status = 200, description = "Job order totals", body = crate::services::production::JobOrderTotals),
        (status = 404, description = "Job order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn get_job_order_waste(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let totals = state.services.production.job_order_waste(id).await?;
    Ok(success_response(totals))
}

pub fn job_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_job_order))
        .route("/", get(list_job_orders))
        .route("/:id", get(get_job_order))
        .route("/:id", put(update_job_order))
        .route("/:id", delete(delete_job_order))
        .route("/:id/waste", get(get_job_order_waste))
}
