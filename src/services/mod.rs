//! Business logic services

pub mod checkouts;
pub mod dispatch;
pub mod equipment;

use crate::{config::AppConfig, store::Store};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub checkouts: checkouts::CheckoutsService,
    pub dispatcher: dispatch::Dispatcher,
}

impl Services {
    /// Create all services over the shared store
    pub fn new(store: Store, config: &AppConfig) -> Self {
        let equipment = equipment::EquipmentService::new(store.clone());
        let checkouts = checkouts::CheckoutsService::new(store.clone());
        let dispatcher = dispatch::Dispatcher::new(
            equipment.clone(),
            checkouts.clone(),
            store.idempotency,
            config.owner.clone(),
        );
        Self {
            equipment,
            checkouts,
            dispatcher,
        }
    }
}
