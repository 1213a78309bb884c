use crate::{
    db::DbPool,
    entities::maintenance_record::{
        self, Entity as MaintenanceEntity, Model as MaintenanceModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReportMaintenanceRequest {
    pub machine_id: i32,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MaintenanceListResponse {
    pub records: Vec<MaintenanceModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for tracking machine maintenance
#[derive(Clone)]
pub struct MaintenanceService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl MaintenanceService {
    /// Creates a new maintenance service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Reports a maintenance issue against a machine
    #[instrument(skip(self, request), fields(machine_id = %request.machine_id))]
    pub async fn report_issue(
        &self,
        request: ReportMaintenanceRequest,
    ) -> Result<MaintenanceModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let machine = crate::entities::machine::Entity::find_by_id(request.machine_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if machine.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Machine {} not found",
                request.machine_id
            )));
        }

        let model = maintenance_record::ActiveModel {
            machine_id: Set(request.machine_id),
            description: Set(request.description),
            status: Set("Open".to_string()),
            reported_at: Set(Utc::now()),
            resolved_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create maintenance record");
            ServiceError::DatabaseError(e)
        })?;

        info!(record_id = %model.id, machine_id = %model.machine_id, "Maintenance issue reported");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::MaintenanceReported {
                    record_id: model.id,
                    machine_id: model.machine_id,
                })
                .await
            {
                warn!(error = %e, record_id = %model.id, "Failed to send maintenance reported event");
            }
        }

        Ok(model)
    }

    /// Retrieves a maintenance record by ID
    #[instrument(skip(self))]
    pub async fn get_record(&self, record_id: i32) -> Result<Option<MaintenanceModel>, ServiceError> {
        let db = &*self.db_pool;

        MaintenanceEntity::find_by_id(record_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Lists maintenance records, optionally scoped to a machine
    #[instrument(skip(self))]
    pub async fn list_records(
        &self,
        page: u64,
        per_page: u64,
        machine_id: Option<i32>,
    ) -> Result<MaintenanceListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query =
            MaintenanceEntity::find().order_by_desc(maintenance_record::Column::ReportedAt);
        if let Some(machine_id) = machine_id {
            query = query.filter(maintenance_record::Column::MachineId.eq(machine_id));
        }

        let paginator = query.paginate(db, per_page);

        let total = paginator.num_items().await.map_err(ServiceError::DatabaseError)?;
        let records = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(MaintenanceListResponse {
            records,
            total,
            page,
            per_page,
        })
    }

    /// Marks a maintenance record as resolved
    #[instrument(skip(self))]
    pub async fn resolve_record(&self, record_id: i32) -> Result<MaintenanceModel, ServiceError> {
        let db = &*self.db_pool;

        let existing = MaintenanceEntity::find_by_id(record_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Maintenance record {} not found", record_id))
            })?;

        if existing.status == "Resolved" {
            return Err(ServiceError::InvalidStatus(format!(
                "Maintenance record {} is already resolved",
                record_id
            )));
        }

        let machine_id = existing.machine_id;

        let mut active: maintenance_record::ActiveModel = existing.into();
        active.status = Set("Resolved".to_string());
        active.resolved_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(record_id = %record_id, machine_id = %machine_id, "Maintenance record resolved");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::MaintenanceResolved {
                    record_id,
                    machine_id,
                })
                .await
            {
                warn!(error = %e, record_id = %record_id, "Failed to send maintenance resolved event");
            }
        }

        Ok(updated)
    }
}
