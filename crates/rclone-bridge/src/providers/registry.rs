//! Provider registry for explicit dependency injection.
//!
//! The registry is constructed once at startup and injected into the
//! orchestrator; after that it is read-only, so sharing it across
//! concurrent transfers needs no locking.

use std::collections::HashMap;
use std::sync::Arc;

use super::{FtpProvider, LocalProvider, Provider, S3Provider, SftpProvider};
use crate::error::{Result, RcloneError};

/// Registry of backend providers, keyed by driver name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard built-in providers registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(LocalProvider::new());
        registry.register(S3Provider::new());
        registry.register(SftpProvider::new());
        registry.register(FtpProvider::new());
        registry
    }

    /// Register a provider under its driver name.
    ///
    /// Registering a driver that already exists replaces the prior entry.
    pub fn register(&mut self, provider: impl Provider + 'static) {
        self.register_arc(Arc::new(provider));
    }

    /// Register a provider as an Arc (for sharing).
    pub fn register_arc(&mut self, provider: Arc<dyn Provider>) {
        self.providers
            .insert(provider.driver().to_string(), provider);
    }

    /// Get the provider for a driver, failing if none is registered.
    pub fn get(&self, driver: &str) -> Result<Arc<dyn Provider>> {
        self.providers
            .get(driver)
            .cloned()
            .ok_or_else(|| RcloneError::ProviderNotFound(driver.to_string()))
    }

    /// Check if a provider is registered for the driver.
    pub fn has(&self, driver: &str) -> bool {
        self.providers.contains_key(driver)
    }

    /// Get all registered driver names.
    pub fn drivers(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("drivers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
