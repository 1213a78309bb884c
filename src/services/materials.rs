use crate::{
    db::DbPool,
    entities::material::{self, Entity as MaterialEntity, Model as MaterialModel},
    entities::material_input::{self, Entity as MaterialInputEntity, Model as MaterialInputModel},
    entities::mix::{self, Entity as MixEntity, Model as MixModel},
    entities::mix_item::{self, Entity as MixItemEntity, Model as MixItemModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMaterialRequest {
    #[validate(length(min = 1, message = "Material name is required"))]
    pub name: String,
    /// Opening balance; defaults to zero and is immutable afterwards
    pub starting_balance_kg: Option<Decimal>,
    pub low_stock_threshold_kg: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMaterialRequest {
    #[validate(length(min = 1, message = "Material name cannot be empty"))]
    pub name: Option<String>,
    pub low_stock_threshold_kg: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMaterialInputRequest {
    pub quantity_kg: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct MixItemRequest {
    pub material_id: i32,
    pub quantity_kg: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMixRequest {
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "A mix requires at least one item"))]
    pub items: Vec<MixItemRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MixResponse {
    pub mix: MixModel,
    pub items: Vec<MixItemModel>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MaterialListResponse {
    pub materials: Vec<MaterialModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MixListResponse {
    pub mixes: Vec<MixModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

fn generate_token(prefix: &str) -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}-{}", prefix, token.to_uppercase())
}

/// Ledger over raw-material balances.
///
/// `current_balance_kg` is only ever written here: material inputs increment
/// it, deleting an input decrements it by the recorded amount, and mixes
/// consume it. The mix decrement is a conditional update guarded on the
/// balance still covering the requested amount, so two concurrent mixes can
/// never jointly over-consume a material.
#[derive(Clone)]
pub struct MaterialService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl MaterialService {
    /// Creates a new material service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a material with a generated immutable identifier
    #[instrument(skip(self, request), fields(material_name = %request.name))]
    pub async fn create_material(
        &self,
        request: CreateMaterialRequest,
    ) -> Result<MaterialModel, ServiceError> {
        request.validate()?;

        let starting = request.starting_balance_kg.unwrap_or(Decimal::ZERO);
        if starting < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Starting balance cannot be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let model = material::ActiveModel {
            identifier: Set(generate_token("MAT")),
            name: Set(request.name),
            starting_balance_kg: Set(starting),
            current_balance_kg: Set(starting),
            low_stock_threshold_kg: Set(request.low_stock_threshold_kg.unwrap_or(Decimal::ZERO)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create material");
            ServiceError::DatabaseError(e)
        })?;

        info!(material_id = %model.id, identifier = %model.identifier, "Material created successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::MaterialCreated(model.id)).await {
                warn!(error = %e, material_id = %model.id, "Failed to send material created event");
            }
        }

        Ok(model)
    }

    /// Retrieves a material by ID
    #[instrument(skip(self))]
    pub async fn get_material(&self, material_id: i32) -> Result<Option<MaterialModel>, ServiceError> {
        let db = &*self.db_pool;

        MaterialEntity::find_by_id(material_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Lists materials with pagination
    #[instrument(skip(self))]
    pub async fn list_materials(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<MaterialListResponse, ServiceError> {
        let db = &*self.db_pool;

        let paginator = MaterialEntity::find()
            .order_by_asc(material::Column::Identifier)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(ServiceError::DatabaseError)?;
        let materials = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(MaterialListResponse {
            materials,
            total,
            page,
            per_page,
        })
    }

    /// Updates a material's name and threshold. The balances are off limits;
    /// only the ledger paths may touch them.
    #[instrument(skip(self, request))]
    pub async fn update_material(
        &self,
        material_id: i32,
        request: UpdateMaterialRequest,
    ) -> Result<MaterialModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let existing = MaterialEntity::find_by_id(material_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Material {} not found", material_id)))?;

        let mut active: material::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(threshold) = request.low_stock_threshold_kg {
            active.low_stock_threshold_kg = Set(threshold);
        }

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(material_id = %material_id, "Material updated successfully");

        Ok(updated)
    }

    /// Deletes a material. Refused while any input still references it, to
    /// preserve historical ledger integrity.
    #[instrument(skip(self))]
    pub async fn delete_material(&self, material_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = MaterialEntity::find_by_id(material_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Material {} not found", material_id)))?;

        let input_count = MaterialInputEntity::find()
            .filter(material_input::Column::MaterialId.eq(material_id))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if input_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Material {} has {} recorded input(s) and cannot be deleted",
                material_id, input_count
            )));
        }

        existing.delete(db).await.map_err(ServiceError::DatabaseError)?;

        info!(material_id = %material_id, "Material deleted");

        Ok(())
    }

    /// Records a material input, incrementing the parent balance in the same
    /// transaction.
    #[instrument(skip(self, request), fields(material_id = %material_id))]
    pub async fn create_material_input(
        &self,
        material_id: i32,
        request: CreateMaterialInputRequest,
    ) -> Result<MaterialInputModel, ServiceError> {
        request.validate()?;

        if request.quantity_kg <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Input quantity must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        Self::find_material(&txn, material_id).await?;

        let input = material_input::ActiveModel {
            material_id: Set(material_id),
            quantity_kg: Set(request.quantity_kg),
            input_identifier: Set(generate_token("INP")),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::DatabaseError)?;

        MaterialEntity::update_many()
            .col_expr(
                material::Column::CurrentBalanceKg,
                Expr::col(material::Column::CurrentBalanceKg).add(request.quantity_kg),
            )
            .filter(material::Column::Id.eq(material_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            input_id = %input.id,
            material_id = %material_id,
            quantity_kg = %request.quantity_kg,
            "Material input recorded"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::MaterialInputCreated {
                    input_id: input.id,
                    material_id,
                    quantity_kg: request.quantity_kg,
                })
                .await
            {
                warn!(error = %e, input_id = %input.id, "Failed to send material input created event");
            }
        }

        Ok(input)
    }

    /// Deletes a material input, decrementing the parent balance by the
    /// recorded amount. Paired with the corresponding create this restores
    /// the exact prior balance.
    #[instrument(skip(self))]
    pub async fn delete_material_input(&self, input_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let input = MaterialInputEntity::find_by_id(input_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material input {} not found", input_id))
            })?;

        let material_id = input.material_id;
        let quantity_kg = input.quantity_kg;

        MaterialEntity::update_many()
            .col_expr(
                material::Column::CurrentBalanceKg,
                Expr::col(material::Column::CurrentBalanceKg).sub(quantity_kg),
            )
            .filter(material::Column::Id.eq(material_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        input.delete(&txn).await.map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            input_id = %input_id,
            material_id = %material_id,
            quantity_kg = %quantity_kg,
            "Material input deleted, balance restored"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::MaterialInputDeleted {
                    input_id,
                    material_id,
                    quantity_kg,
                })
                .await
            {
                warn!(error = %e, input_id = %input_id, "Failed to send material input deleted event");
            }
        }

        Ok(())
    }

    /// Lists the inputs recorded against a material
    #[instrument(skip(self))]
    pub async fn list_material_inputs(
        &self,
        material_id: i32,
    ) -> Result<Vec<MaterialInputModel>, ServiceError> {
        let db = &*self.db_pool;

        MaterialInputEntity::find()
            .filter(material_input::Column::MaterialId.eq(material_id))
            .order_by_desc(material_input::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Creates a mix, consuming the referenced material balances as one
    /// all-or-nothing unit.
    ///
    /// Every item is first checked against the current balance so the caller
    /// gets a precise shortfall error, then each decrement is issued as a
    /// conditional update that only fires while the balance still covers the
    /// amount. A zero-row decrement means a concurrent writer drained the
    /// balance after the pre-check; the whole transaction rolls back.
    #[instrument(skip(self, request), fields(item_count = request.items.len()))]
    pub async fn create_mix(&self, request: CreateMixRequest) -> Result<MixResponse, ServiceError> {
        request.validate()?;

        for item in &request.items {
            if item.quantity_kg <= Decimal::ZERO {
                return Err(ServiceError::InvalidInput(
                    "Mix item quantities must be positive".to_string(),
                ));
            }
        }

        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        // Pre-check every item before any mutation.
        for item in &request.items {
            let material = Self::find_material(&txn, item.material_id).await?;
            if material.current_balance_kg < item.quantity_kg {
                txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                return Err(ServiceError::InsufficientInventory {
                    material: material.name,
                    available: material.current_balance_kg,
                    required: item.quantity_kg,
                });
            }
        }

        let mix_model = mix::ActiveModel {
            mix_identifier: Set(generate_token("MIX")),
            notes: Set(request.notes.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::DatabaseError)?;

        let mut items = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let result = MaterialEntity::update_many()
                .col_expr(
                    material::Column::CurrentBalanceKg,
                    Expr::col(material::Column::CurrentBalanceKg).sub(item.quantity_kg),
                )
                .filter(material::Column::Id.eq(item.material_id))
                .filter(material::Column::CurrentBalanceKg.gte(item.quantity_kg))
                .exec(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

            if result.rows_affected == 0 {
                // Lost the race against a concurrent consumer.
                let material = Self::find_material(&txn, item.material_id).await?;
                txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                return Err(ServiceError::InsufficientInventory {
                    material: material.name,
                    available: material.current_balance_kg,
                    required: item.quantity_kg,
                });
            }

            let item_model = mix_item::ActiveModel {
                mix_id: Set(mix_model.id),
                material_id: Set(item.material_id),
                quantity_kg: Set(item.quantity_kg),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

            items.push(item_model);
        }

        // Capture post-consumption balances for low-stock signalling before
        // releasing the transaction.
        let mut low_stock = Vec::new();
        for item in &request.items {
            let material = Self::find_material(&txn, item.material_id).await?;
            if material.current_balance_kg < material.low_stock_threshold_kg {
                low_stock.push(material);
            }
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            mix_id = %mix_model.id,
            mix_identifier = %mix_model.mix_identifier,
            item_count = items.len(),
            "Mix created, balances consumed"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::MixCreated {
                    mix_id: mix_model.id,
                })
                .await
            {
                warn!(error = %e, mix_id = %mix_model.id, "Failed to send mix created event");
            }
            for material in low_stock {
                if let Err(e) = event_sender
                    .send(Event::MaterialLowStock {
                        material_id: material.id,
                        identifier: material.identifier.clone(),
                        current_balance_kg: material.current_balance_kg,
                        low_stock_threshold_kg: material.low_stock_threshold_kg,
                    })
                    .await
                {
                    warn!(error = %e, material_id = %material.id, "Failed to send low stock event");
                }
            }
        }

        Ok(MixResponse {
            mix: mix_model,
            items,
        })
    }

    /// Retrieves a mix with its items
    #[instrument(skip(self))]
    pub async fn get_mix(&self, mix_id: i32) -> Result<Option<MixResponse>, ServiceError> {
        let db = &*self.db_pool;

        let Some(mix_model) = MixEntity::find_by_id(mix_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
        else {
            return Ok(None);
        };

        let items = MixItemEntity::find()
            .filter(mix_item::Column::MixId.eq(mix_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(Some(MixResponse {
            mix: mix_model,
            items,
        }))
    }

    /// Lists mixes with pagination
    #[instrument(skip(self))]
    pub async fn list_mixes(&self, page: u64, per_page: u64) -> Result<MixListResponse, ServiceError> {
        let db = &*self.db_pool;

        let paginator = MixEntity::find()
            .order_by_desc(mix::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(ServiceError::DatabaseError)?;
        let mixes = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(MixListResponse {
            mixes,
            total,
            page,
            per_page,
        })
    }

    /// Materials whose balance sits below their low-stock threshold
    #[instrument(skip(self))]
    pub async fn low_stock_materials(&self) -> Result<Vec<MaterialModel>, ServiceError> {
        let db = &*self.db_pool;

        MaterialEntity::find()
            .filter(material::Column::LowStockThresholdKg.gt(Decimal::ZERO))
            .filter(
                Expr::col(material::Column::CurrentBalanceKg)
                    .lt(Expr::col(material::Column::LowStockThresholdKg)),
            )
            .order_by_asc(material::Column::Identifier)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn find_material(
        txn: &DatabaseTransaction,
        material_id: i32,
    ) -> Result<MaterialModel, ServiceError> {
        MaterialEntity::find_by_id(material_id)
            .one(txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Material {} not found", material_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_carry_prefix_and_are_distinct() {
        let a = generate_token("INP");
        let b = generate_token("INP");
        assert!(a.starts_with("INP-"));
        assert_eq!(a.len(), "INP-".len() + 8);
        assert_ne!(a, b);
    }
}
