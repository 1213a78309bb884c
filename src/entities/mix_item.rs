use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mix_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub mix_id: i32,
    pub material_id: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_kg: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mix::Entity",
        from = "Column::MixId",
        to = "super::mix::Column::Id"
    )]
    Mix,
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id"
    )]
    Material,
}

impl Related<super::mix::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mix.def()
    }
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
