//! Checkout ledger

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::checkout::CheckoutRecord;

/// Append-only table of borrow/return events, queryable by borrower
/// identity.
#[derive(Clone, Default)]
pub struct CheckoutLedger {
    records: Arc<RwLock<Vec<CheckoutRecord>>>,
}

impl CheckoutLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a record for a checkout event. The caller holds the equipment's
    /// write lock, which is what keeps a single id from accumulating two
    /// open records.
    pub async fn open(&self, equipment_id: &str, borrower: &str, at: DateTime<Utc>) {
        self.records.write().await.push(CheckoutRecord {
            equipment_id: equipment_id.to_string(),
            borrower: borrower.to_string(),
            checked_out_at: at,
            returned_at: None,
        });
    }

    /// Close the open record for an equipment id, returning the closed
    /// record when one existed
    pub async fn close(&self, equipment_id: &str, at: DateTime<Utc>) -> Option<CheckoutRecord> {
        let mut records = self.records.write().await;
        let open = records
            .iter_mut()
            .find(|r| r.equipment_id == equipment_id && r.returned_at.is_none())?;
        open.returned_at = Some(at);
        Some(open.clone())
    }

    /// All records for one borrower identity, most recent checkout first.
    /// Unknown identities get an empty history, not an error.
    pub async fn for_user(&self, borrower: &str) -> Vec<CheckoutRecord> {
        let records = self.records.read().await;
        let mut history: Vec<CheckoutRecord> = records
            .iter()
            .filter(|r| r.borrower == borrower)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.checked_out_at.cmp(&a.checked_out_at));
        history
    }
}
