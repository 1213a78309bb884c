use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Raw material with a running ledger balance.
///
/// Invariant: `current_balance_kg` equals `starting_balance_kg` plus the sum
/// of all material inputs minus the sum of all mix consumption. The material
/// ledger owns the balance; material inputs and mix items are the only
/// writers, through its increment/decrement paths.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub identifier: String,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub starting_balance_kg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub current_balance_kg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub low_stock_threshold_kg: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::material_input::Entity")]
    MaterialInputs,
    #[sea_orm(has_many = "super::mix_item::Entity")]
    MixItems,
}

impl Related<super::material_input::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaterialInputs.def()
    }
}

impl Related<super::mix_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MixItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
