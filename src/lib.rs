//! Folio — notification and activity backend for a portfolio CMS.
//!
//! The public pages and admin UI live elsewhere; this service owns the
//! notification bell, the activity timeline, and the live-update channel
//! that feeds them.

use std::sync::Arc;

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod store;

use config::Config;
use store::Store;

/// Shared application state passed to handlers. The store is the only
/// shared mutable resource in the process.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self { store, config }
    }
}
