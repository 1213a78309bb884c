pub mod common;
pub mod customers;
pub mod health;
pub mod job_orders;
pub mod machines;
pub mod maintenance;
pub mod materials;
pub mod mixes;
pub mod orders;
pub mod rolls;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<services::CustomerService>,
    pub orders: Arc<services::OrderService>,
    pub job_orders: Arc<services::JobOrderService>,
    pub rolls: Arc<services::RollService>,
    pub production: Arc<services::ProductionLedger>,
    pub materials: Arc<services::MaterialService>,
    pub machines: Arc<services::MachineService>,
    pub maintenance: Arc<services::MaintenanceService>,
}

impl AppServices {
    /// Build the services container over a shared pool and event channel.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let production =
            services::ProductionLedger::new(db_pool.clone(), Some(event_sender.clone()));

        Self {
            customers: Arc::new(services::CustomerService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            orders: Arc::new(services::OrderService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            job_orders: Arc::new(services::JobOrderService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            rolls: Arc::new(services::RollService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
                production.clone(),
            )),
            production: Arc::new(production),
            materials: Arc::new(services::MaterialService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            machines: Arc::new(services::MachineService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            maintenance: Arc::new(services::MaintenanceService::new(db_pool, Some(event_sender))),
        }
    }
}
