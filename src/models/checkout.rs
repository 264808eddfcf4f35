//! Checkout record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One borrow event. Open while `returned_at` is absent; an equipment item
/// has at most one open record at a time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRecord {
    pub equipment_id: String,
    pub borrower: String,
    pub checked_out_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}
