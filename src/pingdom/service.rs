//! Single, explicitly initialized handle to the check service
//!
//! The process installs exactly one [`RemoteCheckClient`] during bootstrap and
//! hands it to the controller. Installing twice, or asking for the client before
//! it was installed, is reported as an error instead of silently succeeding.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::RemoteCheckClient;
use crate::error::{Error, Result};

#[derive(Default)]
pub struct CheckServiceSlot {
    inner: OnceCell<Arc<dyn RemoteCheckClient>>,
}

impl CheckServiceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the check service; fails if one is already installed
    pub fn install(&self, service: Arc<dyn RemoteCheckClient>) -> Result<()> {
        self.inner
            .set(service)
            .map_err(|_| Error::AlreadyInitialized)
    }

    /// Get the installed check service
    pub fn get(&self) -> Result<Arc<dyn RemoteCheckClient>> {
        self.inner.get().cloned().ok_or(Error::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.get().is_some()
    }
}
