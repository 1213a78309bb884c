use crate::{
    db::DbPool,
    entities::order::{self, Entity as OrderEntity, Model as OrderModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
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
pub struct CreateOrderRequest {
    pub customer_id: i32,
    /// Supplied order number; generated when absent
    pub order_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, message = "Status cannot be empty"))]
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Generates a short unique order number, e.g. "ORD-4F7KQ2XN"
fn generate_order_number() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("ORD-{}", token.to_uppercase())
}

/// Service for managing customer orders
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    /// Creates a new order service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new order for a customer
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let customer = crate::entities::customer::Entity::find_by_id(request.customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if customer.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Customer {} not found",
                request.customer_id
            )));
        }

        let order_number = request.order_number.unwrap_or_else(generate_order_number);

        let model = order::ActiveModel {
            order_number: Set(order_number),
            customer_id: Set(request.customer_id),
            status: Set("Pending".to_string()),
            notes: Set(request.notes),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create order");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %model.id, order_number = %model.order_number, "Order created successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderCreated(model.id)).await {
                warn!(error = %e, order_id = %model.id, "Failed to send order created event");
            }
        }

        Ok(model)
    }

    /// Retrieves an order by ID
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i32) -> Result<Option<OrderModel>, ServiceError> {
        let db = &*self.db_pool;

        OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Lists orders with pagination, optionally scoped to a customer
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
        customer_id: Option<i32>,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(customer_id) = customer_id {
            query = query.filter(order::Column::CustomerId.eq(customer_id));
        }

        let paginator = query.paginate(db, per_page);

        let total = paginator.num_items().await.map_err(ServiceError::DatabaseError)?;
        let orders = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }

    /// Updates an order's status and notes
    #[instrument(skip(self, request))]
    pub async fn update_order(
        &self,
        order_id: i32,
        request: UpdateOrderRequest,
    ) -> Result<OrderModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let existing = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let mut active: order::ActiveModel = existing.into();
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, status = %updated.status, "Order updated successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderUpdated(order_id)).await {
                warn!(error = %e, order_id = %order_id, "Failed to send order updated event");
            }
        }

        Ok(updated)
    }

    /// Deletes an order and, via cascading foreign keys, its job orders and rolls
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        existing.delete(db).await.map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, "Order deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderDeleted(order_id)).await {
                warn!(error = %e, order_id = %order_id, "Failed to send order deleted event");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_order_numbers_are_distinct() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert!(a.starts_with("ORD-"));
        assert_eq!(a.len(), "ORD-".len() + 8);
        assert_ne!(a, b);
    }
}
