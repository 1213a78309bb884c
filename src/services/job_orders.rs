use crate::{
    db::DbPool,
    entities::job_order::{self, Entity as JobOrderEntity, Model as JobOrderModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateJobOrderRequest {
    pub order_id: i32,
    /// Target quantity to produce; immutable after creation
    pub quantity: Decimal,
    pub size_details: Option<String>,
}

/// Patch for mutable job-order fields. The ordered quantity and the derived
/// aggregates are deliberately absent; the production ledger owns the latter.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateJobOrderRequest {
    #[validate(length(min = 1, message = "Status cannot be empty"))]
    pub status: Option<String>,
    pub size_details: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobOrderListResponse {
    pub job_orders: Vec<JobOrderModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for managing job orders
#[derive(Clone)]
pub struct JobOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl JobOrderService {
    /// Creates a new job order service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a job order under an existing order
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn create_job_order(
        &self,
        request: CreateJobOrderRequest,
    ) -> Result<JobOrderModel, ServiceError> {
        request.validate()?;

        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Job order quantity must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let order = crate::entities::order::Entity::find_by_id(request.order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {} not found", request.order_id))
            })?;

        let model = job_order::ActiveModel {
            order_id: Set(order.id),
            customer_id: Set(order.customer_id),
            quantity: Set(request.quantity),
            produced_quantity: Set(Decimal::ZERO),
            waste_quantity: Set(Decimal::ZERO),
            production_status: Set("Not Started".to_string()),
            status: Set("Pending".to_string()),
            size_details: Set(request.size_details),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create job order");
            ServiceError::DatabaseError(e)
        })?;

        info!(job_order_id = %model.id, order_id = %model.order_id, "Job order created successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::JobOrderCreated(model.id)).await {
                warn!(error = %e, job_order_id = %model.id, "Failed to send job order created event");
            }
        }

        Ok(model)
    }

    /// Retrieves a job order by ID
    #[instrument(skip(self))]
    pub async fn get_job_order(&self, job_order_id: i32) -> Result<Option<JobOrderModel>, ServiceError> {
        let db = &*self.db_pool;

        JobOrderEntity::find_by_id(job_order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Lists job orders with pagination, optionally scoped to an order
    #[instrument(skip(self))]
    pub async fn list_job_orders(
        &self,
        page: u64,
        per_page: u64,
        order_id: Option<i32>,
    ) -> Result<JobOrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = JobOrderEntity::find().order_by_desc(job_order::Column::CreatedAt);
        if let Some(order_id) = order_id {
            query = query.filter(job_order::Column::OrderId.eq(order_id));
        }

        let paginator = query.paginate(db, per_page);

        let total = paginator.num_items().await.map_err(ServiceError::DatabaseError)?;
        let job_orders = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(JobOrderListResponse {
            job_orders,
            total,
            page,
            per_page,
        })
    }

    /// Updates a job order's mutable fields
    #[instrument(skip(self, request))]
    pub async fn update_job_order(
        &self,
        job_order_id: i32,
        request: UpdateJobOrderRequest,
    ) -> Result<JobOrderModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let existing = JobOrderEntity::find_by_id(job_order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Job order {} not found", job_order_id))
            })?;

        let mut active: job_order::ActiveModel = existing.into();
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(size_details) = request.size_details {
            active.size_details = Set(Some(size_details));
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(job_order_id = %job_order_id, "Job order updated successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::JobOrderUpdated(job_order_id)).await {
                warn!(error = %e, job_order_id = %job_order_id, "Failed to send job order updated event");
            }
        }

        Ok(updated)
    }

    /// Deletes a job order and its rolls (cascading foreign key)
    #[instrument(skip(self))]
    pub async fn delete_job_order(&self, job_order_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = JobOrderEntity::find_by_id(job_order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Job order {} not found", job_order_id))
            })?;

        existing.delete(db).await.map_err(ServiceError::DatabaseError)?;

        info!(job_order_id = %job_order_id, "Job order deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::JobOrderDeleted(job_order_id)).await {
                warn!(error = %e, job_order_id = %job_order_id, "Failed to send job order deleted event");
            }
        }

        Ok(())
    }
}
