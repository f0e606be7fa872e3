//! Application state management
//!
//! Shared state handed to every request handler via Axum's State extractor.
//! The store is held behind the [`DataStore`] trait so handlers never know
//! which backend is running.

use std::sync::Arc;

use crate::{config::Config, mirror::MirrorHandle, store::DataStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Selected persistence backend
    pub store: Arc<dyn DataStore>,

    /// Spreadsheet mirror handle (disabled when no mirror is configured)
    pub mirror: MirrorHandle,

    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(store: Arc<dyn DataStore>, mirror: MirrorHandle, config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                mirror,
                config,
            }),
        }
    }

    /// Get a reference to the data store
    pub fn store(&self) -> &dyn DataStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the mirror handle
    pub fn mirror(&self) -> &MirrorHandle {
        &self.inner.mirror
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
