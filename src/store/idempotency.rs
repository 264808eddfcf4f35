//! Idempotency ledger
//!
//! Deduplicates retried invocations by caller-supplied key. The first
//! request to present a key executes the operation; concurrent requests
//! with the same key wait for that execution's outcome instead of running
//! the operation a second time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::{watch, Mutex};

use crate::error::{AppError, AppResult};

/// Terminal outcome of an invocation: the HTTP status and JSON body
/// originally produced, replayed verbatim for duplicate keys
#[derive(Debug, Clone)]
pub struct Outcome {
    pub status: u16,
    pub body: Value,
}

/// Resolution of a key lookup
pub enum Resolution {
    /// No prior entry; the caller must execute the operation and then call
    /// `record` (or `abandon` on an infrastructure failure)
    Fresh,
    /// A completed entry exists; return the stored outcome without
    /// re-executing
    Replay(Outcome),
}

enum EntryState {
    InFlight,
    Completed(Outcome),
}

struct Entry {
    operation: String,
    fingerprint: String,
    state: EntryState,
    done_tx: watch::Sender<bool>,
    created_at: DateTime<Utc>,
}

/// Content fingerprint of an invocation: the operation name plus the
/// canonical JSON form of its input (serde_json serializes object keys in
/// sorted order).
pub fn fingerprint(operation: &str, input: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update(b"\n");
    hasher.update(input.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone)]
pub struct IdempotencyLedger {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    wait_timeout: Duration,
    retention: Option<chrono::Duration>,
}

impl IdempotencyLedger {
    pub fn new(wait_timeout: Duration, retention: Option<chrono::Duration>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            wait_timeout,
            retention,
        }
    }

    /// Resolve a key. Compare-and-insert of an in-flight marker on first
    /// sight; later arrivals with a matching operation and fingerprint wait
    /// for the winner's outcome, bounded by the configured timeout. A key
    /// reused with a different operation or input is a caller error.
    pub async fn resolve(
        &self,
        key: &str,
        operation: &str,
        fingerprint: &str,
    ) -> AppResult<Resolution> {
        loop {
            let mut done_rx = {
                let mut entries = self.entries.lock().await;
                self.prune(&mut entries);
                match entries.get(key) {
                    None => {
                        let (done_tx, _) = watch::channel(false);
                        entries.insert(
                            key.to_string(),
                            Entry {
                                operation: operation.to_string(),
                                fingerprint: fingerprint.to_string(),
                                state: EntryState::InFlight,
                                done_tx,
                                created_at: Utc::now(),
                            },
                        );
                        return Ok(Resolution::Fresh);
                    }
                    Some(entry) => {
                        if entry.operation != operation || entry.fingerprint != fingerprint {
                            return Err(AppError::IdempotencyKeyConflict(format!(
                                "idempotency key {} was first used for {} with different input",
                                key, entry.operation
                            )));
                        }
                        match &entry.state {
                            EntryState::Completed(outcome) => {
                                return Ok(Resolution::Replay(outcome.clone()))
                            }
                            EntryState::InFlight => entry.done_tx.subscribe(),
                        }
                    }
                }
            };

            // Wait outside the table lock for the in-flight execution, then
            // take another look. A dropped sender means the entry was
            // abandoned and this request may become the fresh executor.
            if tokio::time::timeout(self.wait_timeout, done_rx.changed())
                .await
                .is_err()
            {
                return Err(AppError::Timeout(format!(
                    "timed out waiting for in-flight request with idempotency key {}",
                    key
                )));
            }
        }
    }

    /// Store the terminal outcome for an in-flight key and wake waiters
    pub async fn record(&self, key: &str, outcome: Outcome) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.state = EntryState::Completed(outcome);
            let _ = entry.done_tx.send(true);
        }
    }

    /// Drop an in-flight entry after an infrastructure failure so the same
    /// key can retry once conditions recover
    pub async fn abandon(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.remove(key) {
            let _ = entry.done_tx.send(true);
        }
    }

    fn prune(&self, entries: &mut HashMap<String, Entry>) {
        if let Some(retention) = self.retention {
            let cutoff = Utc::now() - retention;
            entries.retain(|_, entry| {
                matches!(entry.state, EntryState::InFlight) || entry.created_at >= cutoff
            });
        }
    }
}
