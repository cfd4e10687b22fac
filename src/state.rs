//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It is
//! immutable after startup: typed config plus HTTP client handles. Per-request
//! session state lives in `AuthSession`, never here.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::backend::{AuthApi, BackendClient, BackendError};
use crate::services::storage::{StorageClient, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Clone is required by Axum; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// CRUD passthrough to the backend.
    pub backend: BackendClient,
    /// Auth calls. Usually the same client as `backend`.
    pub auth: Arc<dyn AuthApi>,
    /// `None` when storage is not configured; uploads answer 503.
    pub storage: Option<StorageClient>,
}

impl AppState {
    /// Build every outbound client from config.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: AppConfig) -> Result<Self, StateError> {
        let backend = BackendClient::new(config.backend_url.clone(), config.timeouts)?;
        let storage = config
            .storage
            .as_ref()
            .map(|storage| StorageClient::new(storage, config.timeouts))
            .transpose()?;
        if storage.is_none() {
            tracing::warn!("object storage not configured; document uploads disabled");
        }
        Ok(Self { auth: Arc::new(backend.clone()), backend, storage, config: Arc::new(config) })
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.config.cookie_secure
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
