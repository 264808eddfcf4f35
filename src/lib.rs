//! Toolcrib Equipment Registry
//!
//! A Rust implementation of the Toolcrib equipment registry server,
//! providing an idempotent JSON invocation API for managing equipment,
//! checkouts, and per-user borrow history.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
