//! Seed feed file
//!
//! The registry can be pre-populated from the JSON document served by the
//! read-only equipment feed. The feed is not authoritative once the service
//! is live.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Top-level shape of the feed document
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub equipment: Vec<SeedEquipment>,
}

/// One feed entry
#[derive(Debug, Deserialize)]
pub struct SeedEquipment {
    pub equipment_id: String,
    pub equipment_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub equipment_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub checked_out_by: Option<String>,
    #[serde(default)]
    pub last_checked_out_at: Option<DateTime<Utc>>,
}

impl SeedFile {
    /// Read and parse a feed document from disk
    pub fn load(path: &str) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Internal(format!("cannot read seed file {}: {}", path, e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(format!("cannot parse seed file {}: {}", path, e)))
    }
}
