//! In-memory store layer
//!
//! The registry's tables live in process memory and are owned by the
//! service; nothing outside this module touches them by reference.

pub mod checkouts;
pub mod equipment;
pub mod idempotency;

use std::time::Duration;

use crate::config::{IdempotencyConfig, StoreConfig};

/// Main store struct holding the in-memory tables
#[derive(Clone)]
pub struct Store {
    pub equipment: equipment::EquipmentStore,
    pub checkouts: checkouts::CheckoutLedger,
    pub idempotency: idempotency::IdempotencyLedger,
}

impl Store {
    /// Create an empty store with the configured timeouts
    pub fn new(store_config: &StoreConfig, idempotency_config: &IdempotencyConfig) -> Self {
        Self {
            equipment: equipment::EquipmentStore::new(Duration::from_millis(
                store_config.lock_timeout_ms,
            )),
            checkouts: checkouts::CheckoutLedger::new(),
            idempotency: idempotency::IdempotencyLedger::new(
                Duration::from_millis(idempotency_config.wait_timeout_ms),
                idempotency_config
                    .retention_hours
                    .map(|hours| chrono::Duration::hours(hours as i64)),
            ),
        }
    }
}
