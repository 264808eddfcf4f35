//! Invocation envelope and per-operation input shapes
//!
//! The wire contract is the `{idempotencyKey, input, key, options}` envelope
//! posted to `/invoke/:operation`, with operation input fields carrying a
//! leading underscore (`_id`, `_equipment_name`, ...).

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Request envelope for `POST /invoke/:operation`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest {
    /// Caller-supplied token guaranteeing at-most-once side effects
    pub idempotency_key: String,
    /// Operation-specific input fields
    #[serde(default)]
    #[schema(value_type = Object)]
    pub input: Value,
    /// Caller identity; empty string for anonymous callers
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: Value,
}

impl InvokeRequest {
    /// Parse the envelope out of a raw request body
    pub fn from_body(body: Value) -> AppResult<Self> {
        let request: InvokeRequest = serde_json::from_value(body)
            .map_err(|e| AppError::InvalidInput(format!("malformed envelope: {}", e)))?;
        if request.idempotency_key.is_empty() {
            return Err(AppError::InvalidInput(
                "idempotencyKey must not be empty".to_string(),
            ));
        }
        Ok(request)
    }
}

/// Operations routable through the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddEquipment,
    CheckoutEquipment,
    ReturnEquipment,
    RemoveEquipment,
    UpdateEquipmentStatus,
    GetEquipmentDetails,
    GetAllEquipment,
    GetUserCheckouts,
    Owner,
}

impl Operation {
    /// Resolve a wire operation name
    pub fn parse(name: &str) -> AppResult<Self> {
        match name {
            "addEquipment" => Ok(Operation::AddEquipment),
            "checkoutEquipment" => Ok(Operation::CheckoutEquipment),
            "returnEquipment" => Ok(Operation::ReturnEquipment),
            "removeEquipment" => Ok(Operation::RemoveEquipment),
            "updateEquipmentStatus" => Ok(Operation::UpdateEquipmentStatus),
            "getEquipmentDetails" => Ok(Operation::GetEquipmentDetails),
            "getAllEquipment" => Ok(Operation::GetAllEquipment),
            "getUserCheckouts" => Ok(Operation::GetUserCheckouts),
            "owner" => Ok(Operation::Owner),
            _ => Err(AppError::UnknownOperation(format!(
                "no operation named '{}'",
                name
            ))),
        }
    }

    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddEquipment => "addEquipment",
            Operation::CheckoutEquipment => "checkoutEquipment",
            Operation::ReturnEquipment => "returnEquipment",
            Operation::RemoveEquipment => "removeEquipment",
            Operation::UpdateEquipmentStatus => "updateEquipmentStatus",
            Operation::GetEquipmentDetails => "getEquipmentDetails",
            Operation::GetAllEquipment => "getAllEquipment",
            Operation::GetUserCheckouts => "getUserCheckouts",
            Operation::Owner => "owner",
        }
    }

    /// Whether only the configured owner may invoke this operation
    pub fn owner_only(&self) -> bool {
        matches!(
            self,
            Operation::AddEquipment | Operation::RemoveEquipment | Operation::UpdateEquipmentStatus
        )
    }
}

/// Deserialize an operation input, mapping shape errors to InvalidInput
pub fn parse_input<T: DeserializeOwned>(input: &Value) -> AppResult<T> {
    serde_json::from_value(input.clone())
        .map_err(|e| AppError::InvalidInput(format!("invalid input: {}", e)))
}

#[derive(Debug, Deserialize)]
pub struct AddEquipmentInput {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_equipment_name")]
    pub equipment_name: String,
    #[serde(rename = "_description", default)]
    pub description: Option<String>,
    #[serde(rename = "_equipmentType")]
    pub equipment_type: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutEquipmentInput {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_borrowerName")]
    pub borrower_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReturnEquipmentInput {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveEquipmentInput {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_removalReason")]
    pub removal_reason: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEquipmentStatusInput {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_newStatus")]
    pub new_status: String,
    #[serde(rename = "_statusReason")]
    pub status_reason: String,
}

#[derive(Debug, Deserialize)]
pub struct GetEquipmentDetailsInput {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct GetUserCheckoutsInput {
    #[serde(rename = "_user")]
    pub user: String,
}
