use anyhow::Result;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::prelude::*;
use std::time::Duration;
use tracing::{error, info};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_customers_table::Migration),
            Box::new(m20240301_000002_create_orders_table::Migration),
            Box::new(m20240301_000003_create_job_orders_table::Migration),
            Box::new(m20240301_000004_create_rolls_table::Migration),
            Box::new(m20240301_000005_create_machines_table::Migration),
            Box::new(m20240301_000006_create_maintenance_records_table::Migration),
            Box::new(m20240301_000007_create_materials_table::Migration),
            Box::new(m20240301_000008_create_material_inputs_table::Migration),
            Box::new(m20240301_000009_create_mix_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_name")
                        .table(Customers::Table)
                        .col(Customers::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        Name,
        Phone,
        Address,
        CreatedAt,
    }
}

mod m20240301_000002_create_orders_table {

    use sea_orm_migration::prelude::*;

    use super::m20240301_000001_create_customers_table::Customers;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::CustomerId).integer().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer_id")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_order_number")
                        .table(Orders::Table)
                        .col(Orders::OrderNumber)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        OrderNumber,
        CustomerId,
        Status,
        Notes,
        CreatedAt,
    }
}

mod m20240301_000003_create_job_orders_table {

    use sea_orm_migration::prelude::*;

    use super::m20240301_000001_create_customers_table::Customers;
    use super::m20240301_000002_create_orders_table::Orders;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_job_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(JobOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(JobOrders::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(JobOrders::OrderId).integer().not_null())
                        .col(ColumnDef::new(JobOrders::CustomerId).integer().not_null())
                        .col(
                            ColumnDef::new(JobOrders::Quantity)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JobOrders::ProducedQuantity)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(JobOrders::WasteQuantity)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(JobOrders::ProductionStatus)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(JobOrders::Status).string().not_null())
                        .col(ColumnDef::new(JobOrders::SizeDetails).string().null())
                        .col(ColumnDef::new(JobOrders::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_job_orders_order_id")
                                .from(JobOrders::Table, JobOrders::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_job_orders_customer_id")
                                .from(JobOrders::Table, JobOrders::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_job_orders_order_id")
                        .table(JobOrders::Table)
                        .col(JobOrders::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_job_orders_production_status")
                        .table(JobOrders::Table)
                        .col(JobOrders::ProductionStatus)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(JobOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum JobOrders {
        Table,
        Id,
        OrderId,
        CustomerId,
        Quantity,
        ProducedQuantity,
        WasteQuantity,
        ProductionStatus,
        Status,
        SizeDetails,
        CreatedAt,
    }
}

mod m20240301_000004_create_rolls_table {

    use sea_orm_migration::prelude::*;

    use super::m20240301_000003_create_job_orders_table::JobOrders;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_rolls_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Rolls::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Rolls::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Rolls::JobOrderId).integer().not_null())
                        .col(ColumnDef::new(Rolls::RollNumber).integer().not_null())
                        .col(
                            ColumnDef::new(Rolls::ExtrudingQty)
                                .decimal_len(19, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Rolls::PrintingQty)
                                .decimal_len(19, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(Rolls::CuttingQty).decimal_len(19, 4).null())
                        .col(ColumnDef::new(Rolls::Status).string().not_null())
                        .col(ColumnDef::new(Rolls::CreatedDate).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_rolls_job_order_id")
                                .from(Rolls::Table, Rolls::JobOrderId)
                                .to(JobOrders::Table, JobOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_rolls_job_order_id")
                        .table(Rolls::Table)
                        .col(Rolls::JobOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_rolls_status")
                        .table(Rolls::Table)
                        .col(Rolls::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Rolls::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Rolls {
        Table,
        Id,
        JobOrderId,
        RollNumber,
        ExtrudingQty,
        PrintingQty,
        CuttingQty,
        Status,
        CreatedDate,
    }
}

mod m20240301_000005_create_machines_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_machines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Machines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Machines::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Machines::Identifier)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Machines::Name).string().not_null())
                        .col(ColumnDef::new(Machines::Section).string().not_null())
                        .col(ColumnDef::new(Machines::Status).string().not_null())
                        .col(ColumnDef::new(Machines::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_machines_section")
                        .table(Machines::Table)
                        .col(Machines::Section)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Machines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Machines {
        Table,
        Id,
        Identifier,
        Name,
        Section,
        Status,
        CreatedAt,
    }
}

mod m20240301_000006_create_maintenance_records_table {

    use sea_orm_migration::prelude::*;

    use super::m20240301_000005_create_machines_table::Machines;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_maintenance_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaintenanceRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaintenanceRecords::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecords::MachineId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecords::Description)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecords::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecords::ReportedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecords::ResolvedAt)
                                .timestamp()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_maintenance_records_machine_id")
                                .from(MaintenanceRecords::Table, MaintenanceRecords::MachineId)
                                .to(Machines::Table, Machines::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_maintenance_records_machine_id")
                        .table(MaintenanceRecords::Table)
                        .col(MaintenanceRecords::MachineId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaintenanceRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum MaintenanceRecords {
        Table,
        Id,
        MachineId,
        Description,
        Status,
        ReportedAt,
        ResolvedAt,
    }
}

mod m20240301_000007_create_materials_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000007_create_materials_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Materials::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Materials::Identifier)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Materials::Name).string().not_null())
                        .col(
                            ColumnDef::new(Materials::StartingBalanceKg)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Materials::CurrentBalanceKg)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Materials::LowStockThresholdKg)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Materials::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_materials_identifier")
                        .table(Materials::Table)
                        .col(Materials::Identifier)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Materials {
        Table,
        Id,
        Identifier,
        Name,
        StartingBalanceKg,
        CurrentBalanceKg,
        LowStockThresholdKg,
        CreatedAt,
    }
}

mod m20240301_000008_create_material_inputs_table {

    use sea_orm_migration::prelude::*;

    use super::m20240301_000007_create_materials_table::Materials;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000008_create_material_inputs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaterialInputs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaterialInputs::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialInputs::MaterialId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialInputs::QuantityKg)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialInputs::InputIdentifier)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(MaterialInputs::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_material_inputs_material_id")
                                .from(MaterialInputs::Table, MaterialInputs::MaterialId)
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_material_inputs_material_id")
                        .table(MaterialInputs::Table)
                        .col(MaterialInputs::MaterialId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaterialInputs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum MaterialInputs {
        Table,
        Id,
        MaterialId,
        QuantityKg,
        InputIdentifier,
        CreatedAt,
    }
}

mod m20240301_000009_create_mix_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240301_000007_create_materials_table::Materials;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000009_create_mix_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Mixes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Mixes::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Mixes::MixIdentifier)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Mixes::Notes).string().null())
                        .col(ColumnDef::new(Mixes::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MixItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MixItems::Id)
                                .integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MixItems::MixId).integer().not_null())
                        .col(ColumnDef::new(MixItems::MaterialId).integer().not_null())
                        .col(
                            ColumnDef::new(MixItems::QuantityKg)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_mix_items_mix_id")
                                .from(MixItems::Table, MixItems::MixId)
                                .to(Mixes::Table, Mixes::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_mix_items_material_id")
                                .from(MixItems::Table, MixItems::MaterialId)
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_mix_items_mix_id")
                        .table(MixItems::Table)
                        .col(MixItems::MixId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_mix_items_material_id")
                        .table(MixItems::Table)
                        .col(MixItems::MaterialId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MixItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Mixes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Mixes {
        Table,
        Id,
        MixIdentifier,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum MixItems {
        Table,
        Id,
        MixId,
        MaterialId,
        QuantityKg,
    }
}

// Database migration CLI runner
pub async fn run_migration(db_url: &str) -> Result<()> {
    info!("Setting up database connection for migrations");

    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;

    info!("Running database migrations");

    let result = Migrator::up(&db, None).await;

    match result {
        Ok(_) => {
            info!("Migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Migration failed: {}", e);
            Err(e.into())
        }
    }
}
