use super::common::{created_response, no_content_response, success_response, PaginationParams};
use super::AppState;
use crate::errors::ServiceError;
use crate::services::customers::{CreateCustomerRequest, UpdateCustomerRequest};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};

/// Create a customer
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state.services.customers.create_customer(request).await?;
    Ok(created_response(customer))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state
        .services
        .customers
        .get_customer(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", id)))?;
    Ok(success_response(customer))
}

async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let customers = state
        .services
        .customers
        .list_customers(params.page, params.per_page)
        .await?;
    Ok(success_response(customers))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state
        .services
        .customers
        .update_customer(id, request)
        .await?;
    Ok(success_response(customer))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.delete_customer(id).await?;
    Ok(no_content_response())
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_customer))
        .route("/", get(list_customers))
        .route("/:id", get(get_customer))
        .route("/:id", put(update_customer))
        .route("/:id", delete(delete_customer))
}
