use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity, Model as CustomerModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
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
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, message = "Customer name cannot be empty"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerListResponse {
    pub customers: Vec<CustomerModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for managing customers
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CustomerService {
    /// Creates a new customer service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new customer
    #[instrument(skip(self, request), fields(customer_name = %request.name))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let customer = customer::ActiveModel {
            name: Set(request.name),
            phone: Set(request.phone),
            address: Set(request.address),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let model = customer.insert(db).await.map_err(|e| {
            error!(error = %e, "Failed to create customer");
            ServiceError::DatabaseError(e)
        })?;

        info!(customer_id = %model.id, "Customer created successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::CustomerCreated(model.id)).await {
                warn!(error = %e, customer_id = %model.id, "Failed to send customer created event");
            }
        }

        Ok(model)
    }

    /// Retrieves a customer by ID
    #[instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: i32) -> Result<Option<CustomerModel>, ServiceError> {
        let db = &*self.db_pool;

        CustomerEntity::find_by_id(customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Lists customers with pagination
    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<CustomerListResponse, ServiceError> {
        let db = &*self.db_pool;

        let paginator = CustomerEntity::find()
            .order_by_desc(customer::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(ServiceError::DatabaseError)?;
        let customers = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(CustomerListResponse {
            customers,
            total,
            page,
            per_page,
        })
    }

    /// Updates a customer's contact details
    #[instrument(skip(self, request))]
    pub async fn update_customer(
        &self,
        customer_id: i32,
        request: UpdateCustomerRequest,
    ) -> Result<CustomerModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let customer = CustomerEntity::find_by_id(customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))?;

        let mut active: customer::ActiveModel = customer.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(customer_id = %customer_id, "Customer updated successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::CustomerUpdated(customer_id)).await {
                warn!(error = %e, customer_id = %customer_id, "Failed to send customer updated event");
            }
        }

        Ok(updated)
    }

    /// Deletes a customer. Refused while orders still reference it.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, customer_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let customer = CustomerEntity::find_by_id(customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))?;

        let order_count = crate::entities::order::Entity::find()
            .filter(crate::entities::order::Column::CustomerId.eq(customer_id))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if order_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Customer {} still has {} order(s) and cannot be deleted",
                customer_id, order_count
            )));
        }

        customer.delete(db).await.map_err(ServiceError::DatabaseError)?;

        info!(customer_id = %customer_id, "Customer deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::CustomerDeleted(customer_id)).await {
                warn!(error = %e, customer_id = %customer_id, "Failed to send customer deleted event");
            }
        }

        Ok(())
    }
}
