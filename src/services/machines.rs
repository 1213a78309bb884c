use crate::{
    db::DbPool,
    entities::machine::{self, Entity as MachineEntity, Model as MachineModel},
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

/// Production sections a machine can belong to
pub const SECTIONS: [&str; 3] = ["extruding", "printing", "cutting"];

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMachineRequest {
    #[validate(length(min = 1, message = "Machine name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Section is required"))]
    pub section: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMachineRequest {
    #[validate(length(min = 1, message = "Machine name cannot be empty"))]
    pub name: Option<String>,
    pub section: Option<String>,
    #[validate(length(min = 1, message = "Status cannot be empty"))]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MachineListResponse {
    pub machines: Vec<MachineModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

fn generate_machine_identifier() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("MCH-{}", token.to_uppercase())
}

fn validate_section(section: &str) -> Result<(), ServiceError> {
    if SECTIONS.contains(&section) {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "Unknown section '{}'; expected one of: {}",
            section,
            SECTIONS.join(", ")
        )))
    }
}

/// Service for managing production machines
#[derive(Clone)]
pub struct MachineService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl MachineService {
    /// Creates a new machine service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Registers a machine in a production section
    #[instrument(skip(self, request), fields(machine_name = %request.name, section = %request.section))]
    pub async fn create_machine(
        &self,
        request: CreateMachineRequest,
    ) -> Result<MachineModel, ServiceError> {
        request.validate()?;
        validate_section(&request.section)?;

        let db = &*self.db_pool;

        let model = machine::ActiveModel {
            identifier: Set(generate_machine_identifier()),
            name: Set(request.name),
            section: Set(request.section),
            status: Set("Operational".to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create machine");
            ServiceError::DatabaseError(e)
        })?;

        info!(machine_id = %model.id, identifier = %model.identifier, "Machine created successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::MachineCreated(model.id)).await {
                warn!(error = %e, machine_id = %model.id, "Failed to send machine created event");
            }
        }

        Ok(model)
    }

    /// Retrieves a machine by ID
    #[instrument(skip(self))]
    pub async fn get_machine(&self, machine_id: i32) -> Result<Option<MachineModel>, ServiceError> {
        let db = &*self.db_pool;

        MachineEntity::find_by_id(machine_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Lists machines with pagination, optionally filtered by section
    #[instrument(skip(self))]
    pub async fn list_machines(
        &self,
        page: u64,
        per_page: u64,
        section: Option<String>,
    ) -> Result<MachineListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = MachineEntity::find().order_by_asc(machine::Column::Identifier);
        if let Some(section) = section {
            query = query.filter(machine::Column::Section.eq(section));
        }

        let paginator = query.paginate(db, per_page);

        let total = paginator.num_items().await.map_err(ServiceError::DatabaseError)?;
        let machines = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(MachineListResponse {
            machines,
            total,
            page,
            per_page,
        })
    }

    /// Updates a machine's details
    #[instrument(skip(self, request))]
    pub async fn update_machine(
        &self,
        machine_id: i32,
        request: UpdateMachineRequest,
    ) -> Result<MachineModel, ServiceError> {
        request.validate()?;
        if let Some(section) = &request.section {
            validate_section(section)?;
        }

        let db = &*self.db_pool;

        let existing = MachineEntity::find_by_id(machine_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Machine {} not found", machine_id)))?;

        let mut active: machine::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(section) = request.section {
            active.section = Set(section);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(machine_id = %machine_id, "Machine updated successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::MachineUpdated(machine_id)).await {
                warn!(error = %e, machine_id = %machine_id, "Failed to send machine updated event");
            }
        }

        Ok(updated)
    }

    /// Deletes a machine and, via cascading foreign keys, its maintenance history
    #[instrument(skip(self))]
    pub async fn delete_machine(&self, machine_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = MachineEntity::find_by_id(machine_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Machine {} not found", machine_id)))?;

        existing.delete(db).await.map_err(ServiceError::DatabaseError)?;

        info!(machine_id = %machine_id, "Machine deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_validation() {
        assert!(validate_section("extruding").is_ok());
        assert!(validate_section("printing").is_ok());
        assert!(validate_section("cutting").is_ok());
        assert!(validate_section("welding").is_err());
    }

    #[test]
    fn machine_identifiers_carry_prefix() {
        let id = generate_machine_identifier();
        assert!(id.starts_with("MCH-"));
        assert_eq!(id.len(), "MCH-".len() + 6);
    }
}
