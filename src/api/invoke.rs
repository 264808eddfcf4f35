//! Invocation envelope endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::error::AppResult;

/// Invoke a named registry operation
#[utoipa::path(
    post,
    path = "/invoke/{operation}",
    tag = "invoke",
    params(("operation" = String, Path, description = "Operation name, e.g. addEquipment")),
    request_body = crate::models::envelope::InvokeRequest,
    responses(
        (status = 200, description = "Operation outcome"),
        (status = 201, description = "Equipment created"),
        (status = 400, description = "Invalid input or unknown operation", body = crate::error::ErrorResponse),
        (status = 401, description = "Caller is not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse),
        (status = 408, description = "Lock or in-flight wait timed out", body = crate::error::ErrorResponse),
        (status = 409, description = "Invalid state, duplicate id, or idempotency key conflict", body = crate::error::ErrorResponse)
    )
)]
pub async fn invoke_operation(
    State(state): State<crate::AppState>,
    Path(operation): Path<String>,
    Json(body): Json<Value>,
) -> AppResult<Response> {
    let outcome = state.services.dispatcher.invoke(&operation, body).await?;
    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::OK);
    Ok((status, Json(outcome.body)).into_response())
}
