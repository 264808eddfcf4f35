//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, health, invoke};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Toolcrib API",
        version = "1.0.0",
        description = "Equipment Registry and Checkout JSON API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Toolcrib Team", email = "contact@toolcrib.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Invocation envelope
        invoke::invoke_operation,
        // Equipment feed
        equipment::list_equipment,
        equipment::get_equipment,
    ),
    components(
        schemas(
            // Envelope
            crate::models::envelope::InvokeRequest,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentStatus,
            equipment::EquipmentFeed,
            // Checkouts
            crate::models::checkout::CheckoutRecord,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "invoke", description = "Idempotent operation invocation"),
        (name = "equipment", description = "Read-only equipment feed")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
