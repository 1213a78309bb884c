use crate::{
    db::DbPool,
    entities::roll::{self, Entity as RollEntity, Model as RollModel, STATUS_RECEIVED},
    errors::ServiceError,
    events::{Event, EventSender},
    services::production::ProductionLedger,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRollRequest {
    pub job_order_id: i32,
    /// Sequential number within the job order; assigned as max + 1 when absent
    pub roll_number: Option<i32>,
    pub extruding_qty: Option<Decimal>,
    pub printing_qty: Option<Decimal>,
    pub cutting_qty: Option<Decimal>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRollRequest {
    pub extruding_qty: Option<Decimal>,
    pub printing_qty: Option<Decimal>,
    pub cutting_qty: Option<Decimal>,
    #[validate(length(min = 1, message = "Status cannot be empty"))]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RollListResponse {
    pub rolls: Vec<RollModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for managing production rolls.
///
/// Every quantity or status mutation feeds the production ledger as a
/// best-effort side effect: a ledger failure is logged but never blocks the
/// roll mutation itself.
#[derive(Clone)]
pub struct RollService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    ledger: ProductionLedger,
}

impl RollService {
    /// Creates a new roll service instance
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        ledger: ProductionLedger,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            ledger,
        }
    }

    /// Creates a roll under a job order. The roll number is assigned inside
    /// the creation transaction so concurrent creates for the same job order
    /// cannot be handed the same number.
    #[instrument(skip(self, request), fields(job_order_id = %request.job_order_id))]
    pub async fn create_roll(&self, request: CreateRollRequest) -> Result<RollModel, ServiceError> {
        request.validate()?;
        validate_quantities(&[
            request.extruding_qty,
            request.printing_qty,
            request.cutting_qty,
        ])?;

        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let job = crate::entities::job_order::Entity::find_by_id(request.job_order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if job.is_none() {
            txn.rollback().await.map_err(ServiceError::DatabaseError)?;
            return Err(ServiceError::NotFound(format!(
                "Job order {} not found",
                request.job_order_id
            )));
        }

        let roll_number = match request.roll_number {
            Some(n) => n,
            None => {
                let max: Option<i32> = RollEntity::find()
                    .filter(roll::Column::JobOrderId.eq(request.job_order_id))
                    .select_only()
                    .column_as(roll::Column::RollNumber.max(), "max_roll_number")
                    .into_tuple()
                    .one(&txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .flatten();
                max.unwrap_or(0) + 1
            }
        };

        let extruding_set = request.extruding_qty.is_some();

        let model = roll::ActiveModel {
            job_order_id: Set(request.job_order_id),
            roll_number: Set(roll_number),
            extruding_qty: Set(request.extruding_qty),
            printing_qty: Set(request.printing_qty),
            cutting_qty: Set(request.cutting_qty),
            status: Set(request.status.unwrap_or_else(|| "Pending".to_string())),
            created_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create roll");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(roll_id = %model.id, roll_number = %model.roll_number, "Roll created successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::RollCreated {
                    roll_id: model.id,
                    job_order_id: model.job_order_id,
                })
                .await
            {
                warn!(error = %e, roll_id = %model.id, "Failed to send roll created event");
            }
        }

        if extruding_set {
            self.run_ledger(model.job_order_id, true).await;
        }

        Ok(model)
    }

    /// Retrieves a roll by ID
    #[instrument(skip(self))]
    pub async fn get_roll(&self, roll_id: i32) -> Result<Option<RollModel>, ServiceError> {
        let db = &*self.db_pool;

        RollEntity::find_by_id(roll_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Lists rolls with pagination, optionally scoped to a job order
    #[instrument(skip(self))]
    pub async fn list_rolls(
        &self,
        page: u64,
        per_page: u64,
        job_order_id: Option<i32>,
    ) -> Result<RollListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = RollEntity::find()
            .order_by_asc(roll::Column::JobOrderId)
            .order_by_asc(roll::Column::RollNumber);
        if let Some(job_order_id) = job_order_id {
            query = query.filter(roll::Column::JobOrderId.eq(job_order_id));
        }

        let paginator = query.paginate(db, per_page);

        let total = paginator.num_items().await.map_err(ServiceError::DatabaseError)?;
        let rolls = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(RollListResponse {
            rolls,
            total,
            page,
            per_page,
        })
    }

    /// Updates a roll's stage quantities and status, then runs the ledger
    /// paths the change calls for: a recompute when the status transitions
    /// into "Received" or a quantity changes, and the extruded-status rule
    /// when the extruding quantity changes.
    #[instrument(skip(self, request))]
    pub async fn update_roll(
        &self,
        roll_id: i32,
        request: UpdateRollRequest,
    ) -> Result<RollModel, ServiceError> {
        request.validate()?;
        validate_quantities(&[
            request.extruding_qty,
            request.printing_qty,
            request.cutting_qty,
        ])?;

        let db = &*self.db_pool;

        let existing = RollEntity::find_by_id(roll_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Roll {} not found", roll_id)))?;

        let became_received = request
            .status
            .as_deref()
            .map(|s| s == STATUS_RECEIVED && existing.status != STATUS_RECEIVED)
            .unwrap_or(false);
        let extruding_changed = request
            .extruding_qty
            .map(|q| existing.extruding_qty != Some(q))
            .unwrap_or(false);
        let cutting_changed = request
            .cutting_qty
            .map(|q| existing.cutting_qty != Some(q))
            .unwrap_or(false);

        let job_order_id = existing.job_order_id;

        let mut active: roll::ActiveModel = existing.into();
        if let Some(q) = request.extruding_qty {
            active.extruding_qty = Set(Some(q));
        }
        if let Some(q) = request.printing_qty {
            active.printing_qty = Set(Some(q));
        }
        if let Some(q) = request.cutting_qty {
            active.cutting_qty = Set(Some(q));
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(roll_id = %roll_id, status = %updated.status, "Roll updated successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::RollUpdated {
                    roll_id,
                    job_order_id,
                })
                .await
            {
                warn!(error = %e, roll_id = %roll_id, "Failed to send roll updated event");
            }
        }

        if became_received || extruding_changed || cutting_changed {
            self.run_ledger(job_order_id, extruding_changed).await;
        }

        Ok(updated)
    }

    /// Deletes a roll and recomputes the parent job order's aggregates
    #[instrument(skip(self))]
    pub async fn delete_roll(&self, roll_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = RollEntity::find_by_id(roll_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Roll {} not found", roll_id)))?;

        let job_order_id = existing.job_order_id;

        existing.delete(db).await.map_err(ServiceError::DatabaseError)?;

        info!(roll_id = %roll_id, "Roll deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::RollDeleted {
                    roll_id,
                    job_order_id,
                })
                .await
            {
                warn!(error = %e, roll_id = %roll_id, "Failed to send roll deleted event");
            }
        }

        self.run_ledger(job_order_id, true).await;

        Ok(())
    }

    /// Runs the ledger paths as a best-effort side effect. Failures are
    /// surfaced to the operational log only.
    async fn run_ledger(&self, job_order_id: i32, include_extruded_status: bool) {
        if let Err(e) = self.ledger.recompute(job_order_id).await {
            warn!(error = %e, job_order_id = %job_order_id, "Production recompute failed after roll mutation");
        }
        if include_extruded_status {
            if let Err(e) = self.ledger.apply_extruded_status(job_order_id).await {
                warn!(error = %e, job_order_id = %job_order_id, "Extruded-status update failed after roll mutation");
            }
        }
    }
}

fn validate_quantities(quantities: &[Option<Decimal>]) -> Result<(), ServiceError> {
    for qty in quantities.iter().flatten() {
        if *qty < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Stage quantities cannot be negative".to_string(),
            ));
        }
    }
    Ok(())
}
