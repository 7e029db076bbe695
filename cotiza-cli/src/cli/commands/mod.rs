//! Command handlers

pub mod export;
pub mod ingest;
pub mod report;
pub mod stats;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Settings;
use crate::storage::ObjectStorage;

/// Dependencies constructed once at startup and shared by all handlers.
pub struct AppContext {
    pub pool: SqlitePool,
    pub storage: Arc<dyn ObjectStorage>,
    pub settings: Settings,
}
