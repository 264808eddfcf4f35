//! Checkout history service

use crate::{error::AppResult, models::checkout::CheckoutRecord, store::Store};

#[derive(Clone)]
pub struct CheckoutsService {
    store: Store,
}

impl CheckoutsService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Full borrow/return history for one identity, most recent first
    pub async fn get_user_checkouts(&self, user: &str) -> AppResult<Vec<CheckoutRecord>> {
        Ok(self.store.checkouts.for_user(user).await)
    }
}
