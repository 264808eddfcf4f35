//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Equipment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EquipmentStatus {
    Available,
    CheckedOut,
    Maintenance,
    Removed,
    Lost,
}

impl EquipmentStatus {
    /// Parse a wire status label, e.g. the `_newStatus` field
    pub fn parse(label: &str) -> AppResult<Self> {
        match label {
            "Available" => Ok(EquipmentStatus::Available),
            "CheckedOut" => Ok(EquipmentStatus::CheckedOut),
            "Maintenance" => Ok(EquipmentStatus::Maintenance),
            "Removed" => Ok(EquipmentStatus::Removed),
            "Lost" => Ok(EquipmentStatus::Lost),
            _ => Err(AppError::InvalidInput(format!(
                "unknown equipment status '{}'",
                label
            ))),
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EquipmentStatus::Available => "Available",
            EquipmentStatus::CheckedOut => "CheckedOut",
            EquipmentStatus::Maintenance => "Maintenance",
            EquipmentStatus::Removed => "Removed",
            EquipmentStatus::Lost => "Lost",
        };
        write!(f, "{}", label)
    }
}

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    /// Opaque unique id, assigned at creation, immutable
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Free-form category label, e.g. "Computing"
    pub equipment_type: String,
    pub status: EquipmentStatus,
    /// Last known location
    pub location: Option<String>,
    /// Borrower identity, set only while status is CheckedOut
    pub checked_out_by: Option<String>,
    pub last_checked_out_at: Option<DateTime<Utc>>,
    /// Audit note from the last owner-forced status change or removal
    pub status_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Equipment {
    /// Create a fresh Available record
    pub fn new(
        id: String,
        name: String,
        description: Option<String>,
        equipment_type: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            equipment_type,
            status: EquipmentStatus::Available,
            location: None,
            checked_out_by: None,
            last_checked_out_at: None,
            status_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}
