use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Roll status value that makes a roll's cutting quantity count toward the
/// parent job order's produced quantity.
pub const STATUS_RECEIVED: &str = "Received";

/// Physical production unit tracked through extrusion, printing and cutting.
///
/// `roll_number` is sequential per job order (1-based), assigned at creation
/// and never reused. Stage quantities are nullable until the stage is done.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rolls")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub job_order_id: i32,
    pub roll_number: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub extruding_qty: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub printing_qty: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub cutting_qty: Option<Decimal>,
    pub status: String,
    pub created_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job_order::Entity",
        from = "Column::JobOrderId",
        to = "super::job_order::Column::Id"
    )]
    JobOrder,
}

impl Related<super::job_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
