//! Equipment feed endpoints
//!
//! Read-only listing for conventional HTTP consumers, e.g. the
//! prompt-matching façade. Writes go through `/invoke/:operation` only.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::equipment::Equipment};

/// Feed document wrapping the equipment list
#[derive(Serialize, ToSchema)]
pub struct EquipmentFeed {
    pub equipment: Vec<Equipment>,
}

/// List all equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    responses(
        (status = 200, description = "Equipment list", body = EquipmentFeed)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
) -> AppResult<Json<EquipmentFeed>> {
    let equipment = state.services.equipment.list().await;
    Ok(Json(EquipmentFeed { equipment }))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = String, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.get_by_id(&id).await?;
    Ok(Json(equipment))
}
