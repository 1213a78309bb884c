use crate::{
    db::DbPool,
    entities::job_order::{self, Entity as JobOrderEntity},
    entities::roll::{self, Entity as RollEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::Display;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

/// Fine-grained production status derived from received (cut) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum ProductionStatus {
    #[strum(serialize = "Not Started")]
    NotStarted,
    #[strum(serialize = "In Progress")]
    InProgress,
    #[strum(serialize = "Completed")]
    Completed,
    #[strum(serialize = "Overproduced")]
    Overproduced,
}

impl ProductionStatus {
    /// Derives the status from produced output versus the ordered quantity.
    pub fn derive(produced: Decimal, ordered: Decimal) -> Self {
        if produced.is_zero() {
            Self::NotStarted
        } else if produced < ordered {
            Self::InProgress
        } else if produced == ordered {
            Self::Completed
        } else {
            Self::Overproduced
        }
    }
}

/// Recomputed totals for a job order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobOrderTotals {
    pub job_order_id: i32,
    pub quantity: Decimal,
    pub produced_quantity: Decimal,
    pub waste_quantity: Decimal,
    pub production_status: String,
}

/// Waste breakdown for a single roll.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RollWaste {
    pub roll_id: i32,
    pub extruding_qty: Decimal,
    pub cutting_qty: Decimal,
    pub waste_qty: Decimal,
}

/// Derivation engine keeping job-order aggregates consistent with their rolls.
///
/// Produced output counts only rolls whose status is "Received"; waste is the
/// extruded total across all rolls minus produced output, clamped at zero.
/// A separate, looser `status` signal is driven purely by extruded quantity
/// and may disagree with `production_status` mid-workflow. Both signals are
/// kept: `status` reads as "extrusion complete", `production_status` as
/// overall completion.
#[derive(Clone)]
pub struct ProductionLedger {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProductionLedger {
    /// Creates a new production ledger instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Recomputes produced quantity, waste quantity and production status for
    /// a job order from the full set of its rolls, and persists all three in
    /// a single update.
    ///
    /// Returns `Ok(None)` when the job order no longer exists; callers treat
    /// the recompute as a best-effort side effect and must not fail their own
    /// mutation over it.
    #[instrument(skip(self))]
    pub async fn recompute(&self, job_order_id: i32) -> Result<Option<JobOrderTotals>, ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let Some(job) = JobOrderEntity::find_by_id(job_order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
        else {
            txn.rollback().await.map_err(ServiceError::DatabaseError)?;
            warn!(job_order_id = %job_order_id, "Job order missing, skipping recompute");
            return Ok(None);
        };

        let rolls = RollEntity::find()
            .filter(roll::Column::JobOrderId.eq(job_order_id))
            .all(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let produced: Decimal = rolls
            .iter()
            .filter(|r| r.status == roll::STATUS_RECEIVED)
            .filter_map(|r| r.cutting_qty)
            .sum();

        let extruded: Decimal = rolls.iter().filter_map(|r| r.extruding_qty).sum();

        let waste = (extruded - produced).max(Decimal::ZERO);

        let status = ProductionStatus::derive(produced, job.quantity);

        let quantity = job.quantity;
        let mut active: job_order::ActiveModel = job.into();
        active.produced_quantity = Set(produced);
        active.waste_quantity = Set(waste);
        active.production_status = Set(status.to_string());
        active.update(&txn).await.map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        let totals = JobOrderTotals {
            job_order_id,
            quantity,
            produced_quantity: produced,
            waste_quantity: waste,
            production_status: status.to_string(),
        };

        info!(
            job_order_id = %job_order_id,
            produced_quantity = %produced,
            waste_quantity = %waste,
            production_status = %status,
            "Job order totals recomputed"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::JobOrderRecomputed {
                    job_order_id,
                    produced_quantity: produced,
                    waste_quantity: waste,
                    production_status: status.to_string(),
                })
                .await
            {
                warn!(error = %e, job_order_id = %job_order_id, "Failed to send recompute event");
            }
        }

        Ok(Some(totals))
    }

    /// Applies the coarse `status` rule driven purely by extruded quantity:
    /// sum >= ordered quantity sets "Completed", a positive sum below it sets
    /// "In Progress", zero leaves the status untouched.
    #[instrument(skip(self))]
    pub async fn apply_extruded_status(&self, job_order_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let Some(job) = JobOrderEntity::find_by_id(job_order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
        else {
            warn!(job_order_id = %job_order_id, "Job order missing, skipping extruded-status update");
            return Ok(());
        };

        let rolls = RollEntity::find()
            .filter(roll::Column::JobOrderId.eq(job_order_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let extruded: Decimal = rolls.iter().filter_map(|r| r.extruding_qty).sum();

        let new_status = if extruded >= job.quantity {
            Some("Completed")
        } else if extruded > Decimal::ZERO {
            Some("In Progress")
        } else {
            None
        };

        if let Some(new_status) = new_status {
            if job.status != new_status {
                let job_id = job.id;
                let mut active: job_order::ActiveModel = job.into();
                active.status = Set(new_status.to_string());
                active.update(db).await.map_err(ServiceError::DatabaseError)?;
                info!(job_order_id = %job_id, status = %new_status, "Job order extruded status updated");
            }
        }

        Ok(())
    }

    /// Read path: current totals for a job order, recomputed on the fly
    /// without persisting (the stored aggregates are authoritative; this is a
    /// consistency check surface for the waste endpoint).
    #[instrument(skip(self))]
    pub async fn job_order_waste(&self, job_order_id: i32) -> Result<JobOrderTotals, ServiceError> {
        let db = &*self.db_pool;

        let job = JobOrderEntity::find_by_id(job_order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Job order {} not found", job_order_id))
            })?;

        Ok(JobOrderTotals {
            job_order_id,
            quantity: job.quantity,
            produced_quantity: job.produced_quantity,
            waste_quantity: job.waste_quantity,
            production_status: job.production_status,
        })
    }

    /// Read path: waste for a single roll, extruded minus cut, clamped at
    /// zero. Missing stage quantities count as zero.
    #[instrument(skip(self))]
    pub async fn roll_waste(&self, roll_id: i32) -> Result<RollWaste, ServiceError> {
        let db = &*self.db_pool;

        let roll = RollEntity::find_by_id(roll_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Roll {} not found", roll_id)))?;

        let extruding = roll.extruding_qty.unwrap_or(Decimal::ZERO);
        let cutting = roll.cutting_qty.unwrap_or(Decimal::ZERO);

        Ok(RollWaste {
            roll_id,
            extruding_qty: extruding,
            cutting_qty: cutting,
            waste_qty: (extruding - cutting).max(Decimal::ZERO),
        })
    }
}
