pub mod customers;
pub mod job_orders;
pub mod machines;
pub mod maintenance;
pub mod materials;
pub mod orders;
pub mod production;
pub mod rolls;

pub use customers::CustomerService;
pub use job_orders::JobOrderService;
pub use machines::MachineService;
pub use maintenance::MaintenanceService;
pub use materials::MaterialService;
pub use orders::OrderService;
pub use production::ProductionLedger;
pub use rolls::RollService;
