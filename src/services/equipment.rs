//! Equipment service
//!
//! Owns the equipment status state machine:
//! Available ⇄ CheckedOut via checkout/return, Available ⇄ Maintenance/Lost
//! via owner status updates, and any non-Removed state → Removed via
//! removal. Removed is terminal.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        envelope::AddEquipmentInput,
        equipment::{Equipment, EquipmentStatus},
        seed::SeedFile,
    },
    store::Store,
};

#[derive(Clone)]
pub struct EquipmentService {
    store: Store,
}

impl EquipmentService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a new equipment record with status Available
    pub async fn add(&self, input: AddEquipmentInput) -> AppResult<Equipment> {
        if input.id.trim().is_empty() {
            return Err(AppError::InvalidInput("_id must not be empty".to_string()));
        }
        if input.equipment_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "_equipment_name must not be empty".to_string(),
            ));
        }

        let equipment = Equipment::new(
            input.id,
            input.equipment_name,
            input.description,
            input.equipment_type,
            Utc::now(),
        );
        self.store.equipment.insert(equipment.clone()).await?;

        tracing::info!(id = %equipment.id, name = %equipment.name, "equipment added");
        Ok(equipment)
    }

    /// Check out an Available item to a borrower and open a checkout record
    pub async fn checkout(&self, id: &str, borrower: &str) -> AppResult<Equipment> {
        if borrower.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "_borrowerName must not be empty".to_string(),
            ));
        }

        let mut equipment = self.store.equipment.lock(id).await?;
        if equipment.status != EquipmentStatus::Available {
            return Err(AppError::InvalidState(format!(
                "equipment {} is {} and cannot be checked out",
                id, equipment.status
            )));
        }

        let now = Utc::now();
        equipment.status = EquipmentStatus::CheckedOut;
        equipment.checked_out_by = Some(borrower.to_string());
        equipment.last_checked_out_at = Some(now);
        equipment.updated_at = now;

        // Opened while the per-id lock is held, so one id never has two
        // open records
        self.store.checkouts.open(id, borrower, now).await;

        tracing::info!(id = %id, borrower = %borrower, "equipment checked out");
        Ok(equipment.clone())
    }

    /// Return a checked-out item and close its open checkout record
    pub async fn return_equipment(&self, id: &str) -> AppResult<Equipment> {
        let mut equipment = self.store.equipment.lock(id).await?;
        if equipment.status != EquipmentStatus::CheckedOut {
            return Err(AppError::InvalidState(format!(
                "equipment {} is {} and cannot be returned",
                id, equipment.status
            )));
        }

        let now = Utc::now();
        equipment.status = EquipmentStatus::Available;
        equipment.checked_out_by = None;
        equipment.last_checked_out_at = None;
        equipment.updated_at = now;

        self.store.checkouts.close(id, now).await;

        tracing::info!(id = %id, "equipment returned");
        Ok(equipment.clone())
    }

    /// Retire an item permanently. A checked-out item can still be removed
    /// (custody was lost); its open checkout record is closed on the way
    /// out.
    pub async fn remove(&self, id: &str, reason: &str) -> AppResult<Equipment> {
        let mut equipment = self.store.equipment.lock(id).await?;
        if equipment.status == EquipmentStatus::Removed {
            return Err(AppError::InvalidState(format!(
                "equipment {} is already removed",
                id
            )));
        }

        let now = Utc::now();
        if equipment.status == EquipmentStatus::CheckedOut {
            self.store.checkouts.close(id, now).await;
            equipment.checked_out_by = None;
            equipment.last_checked_out_at = None;
        }
        equipment.status = EquipmentStatus::Removed;
        equipment.status_reason = Some(reason.to_string());
        equipment.updated_at = now;

        tracing::info!(id = %id, reason = %reason, "equipment removed");
        Ok(equipment.clone())
    }

    /// Owner-forced status change. Removal and checkout have their own
    /// operations and are rejected here, as is any transition touching a
    /// Removed or CheckedOut item.
    pub async fn update_status(
        &self,
        id: &str,
        new_status: &str,
        reason: &str,
    ) -> AppResult<Equipment> {
        let new_status = EquipmentStatus::parse(new_status)?;

        let mut equipment = self.store.equipment.lock(id).await?;
        if equipment.status == EquipmentStatus::Removed {
            return Err(AppError::InvalidState(format!(
                "equipment {} is removed",
                id
            )));
        }
        if new_status == EquipmentStatus::Removed {
            return Err(AppError::InvalidState(
                "removal must go through removeEquipment".to_string(),
            ));
        }
        if new_status == EquipmentStatus::CheckedOut {
            return Err(AppError::InvalidState(
                "checkout must go through checkoutEquipment".to_string(),
            ));
        }
        if equipment.status == EquipmentStatus::CheckedOut {
            return Err(AppError::InvalidState(format!(
                "equipment {} is checked out and must be returned first",
                id
            )));
        }

        equipment.status = new_status;
        equipment.status_reason = Some(reason.to_string());
        equipment.updated_at = Utc::now();

        tracing::info!(id = %id, status = %new_status, "equipment status updated");
        Ok(equipment.clone())
    }

    /// Look up one record. Removed items stay id-addressable for audit.
    pub async fn get_by_id(&self, id: &str) -> AppResult<Equipment> {
        self.store.equipment.get(id).await
    }

    /// Default listing: every record except Removed ones, name-ordered
    pub async fn list(&self) -> Vec<Equipment> {
        self.store
            .equipment
            .list()
            .await
            .into_iter()
            .filter(|e| e.status != EquipmentStatus::Removed)
            .collect()
    }

    /// Load the read-only feed document into the store. Entries carrying a
    /// borrower are seeded as CheckedOut with a matching open checkout
    /// record so the store invariants hold from the start.
    pub async fn seed(&self, seed: SeedFile) -> AppResult<usize> {
        let now = Utc::now();
        let mut loaded = 0;

        for entry in seed.equipment {
            let mut equipment = Equipment::new(
                entry.equipment_id.clone(),
                entry.equipment_name,
                entry.description,
                entry.equipment_type.unwrap_or_else(|| "Misc".to_string()),
                now,
            );
            equipment.location = entry.location;

            let open_checkout = entry.checked_out_by.map(|borrower| {
                let at = entry.last_checked_out_at.unwrap_or(now);
                equipment.status = EquipmentStatus::CheckedOut;
                equipment.checked_out_by = Some(borrower.clone());
                equipment.last_checked_out_at = Some(at);
                (borrower, at)
            });

            self.store.equipment.insert(equipment).await?;
            if let Some((borrower, at)) = open_checkout {
                self.store
                    .checkouts
                    .open(&entry.equipment_id, &borrower, at)
                    .await;
            }
            loaded += 1;
        }

        Ok(loaded)
    }
}
