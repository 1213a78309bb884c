//! SeaORM entity definitions for the production-management schema.

pub mod customer;
pub mod job_order;
pub mod machine;
pub mod maintenance_record;
pub mod material;
pub mod material_input;
pub mod mix;
pub mod mix_item;
pub mod order;
pub mod roll;
