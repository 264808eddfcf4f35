//! Equipment table with per-id write serialization

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::{
    error::{AppError, AppResult},
    models::equipment::Equipment,
};

/// Id-indexed equipment table. Each record sits behind its own mutex so
/// mutations of one id serialize without blocking traffic on other ids.
#[derive(Clone)]
pub struct EquipmentStore {
    table: Arc<RwLock<HashMap<String, Arc<Mutex<Equipment>>>>>,
    lock_timeout: Duration,
}

impl EquipmentStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            table: Arc::new(RwLock::new(HashMap::new())),
            lock_timeout,
        }
    }

    /// Insert a new record, failing on duplicate id
    pub async fn insert(&self, equipment: Equipment) -> AppResult<()> {
        let mut table = self.table.write().await;
        if table.contains_key(&equipment.id) {
            return Err(AppError::DuplicateId(format!(
                "equipment {} already exists",
                equipment.id
            )));
        }
        table.insert(equipment.id.clone(), Arc::new(Mutex::new(equipment)));
        Ok(())
    }

    /// Acquire the write lock for one id. Waiting longer than the
    /// configured timeout surfaces a retryable Timeout.
    pub async fn lock(&self, id: &str) -> AppResult<OwnedMutexGuard<Equipment>> {
        let slot = {
            let table = self.table.read().await;
            table.get(id).cloned()
        }
        .ok_or_else(|| AppError::NotFound(format!("equipment {} not found", id)))?;

        tokio::time::timeout(self.lock_timeout, slot.lock_owned())
            .await
            .map_err(|_| AppError::Timeout(format!("timed out waiting for equipment {}", id)))
    }

    /// Snapshot one record
    pub async fn get(&self, id: &str) -> AppResult<Equipment> {
        let guard = self.lock(id).await?;
        Ok(guard.clone())
    }

    /// Snapshot all records, name-ordered
    pub async fn list(&self) -> Vec<Equipment> {
        let slots: Vec<Arc<Mutex<Equipment>>> =
            { self.table.read().await.values().cloned().collect() };

        let mut all = Vec::with_capacity(slots.len());
        for slot in slots {
            all.push(slot.lock().await.clone());
        }
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}
