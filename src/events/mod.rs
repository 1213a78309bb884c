use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Customer events
    CustomerCreated(i32),
    CustomerUpdated(i32),
    CustomerDeleted(i32),

    // Order events
    OrderCreated(i32),
    OrderUpdated(i32),
    OrderDeleted(i32),

    // Job order events
    JobOrderCreated(i32),
    JobOrderUpdated(i32),
    JobOrderDeleted(i32),
    JobOrderRecomputed {
        job_order_id: i32,
        produced_quantity: Decimal,
        waste_quantity: Decimal,
        production_status: String,
    },

    // Roll events
    RollCreated {
        roll_id: i32,
        job_order_id: i32,
    },
    RollUpdated {
        roll_id: i32,
        job_order_id: i32,
    },
    RollDeleted {
        roll_id: i32,
        job_order_id: i32,
    },

    // Machine and maintenance events
    MachineCreated(i32),
    MachineUpdated(i32),
    MaintenanceReported {
        record_id: i32,
        machine_id: i32,
    },
    MaintenanceResolved {
        record_id: i32,
        machine_id: i32,
    },

    // Material ledger events
    MaterialCreated(i32),
    MaterialInputCreated {
        input_id: i32,
        material_id: i32,
        quantity_kg: Decimal,
    },
    MaterialInputDeleted {
        input_id: i32,
        material_id: i32,
        quantity_kg: Decimal,
    },
    MixCreated {
        mix_id: i32,
    },
    MaterialLowStock {
        material_id: i32,
        identifier: String,
        current_balance_kg: Decimal,
        low_stock_threshold_kg: Decimal,
    },
}

// Function to process incoming events. This is the single consumer of the
// event channel; senders never block on slow handling because the channel is
// bounded by config.event_channel_capacity.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::MaterialLowStock {
                material_id,
                identifier,
                current_balance_kg,
                low_stock_threshold_kg,
            } => {
                warn!(
                    material_id = %material_id,
                    identifier = %identifier,
                    current_balance_kg = %current_balance_kg,
                    low_stock_threshold_kg = %low_stock_threshold_kg,
                    "Material balance fell below low-stock threshold"
                );
            }
            Event::JobOrderRecomputed {
                job_order_id,
                produced_quantity,
                waste_quantity,
                production_status,
            } => {
                info!(
                    job_order_id = %job_order_id,
                    produced_quantity = %produced_quantity,
                    waste_quantity = %waste_quantity,
                    production_status = %production_status,
                    "Job order production totals recomputed"
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    info!("Event processing loop stopped");
}
