//! [`ApiKeyGuard`] – fail fast when a feature's API key is not configured.
//!
//! The host refuses to serve some features unless the application declared
//! the matching API key.  Checking up front turns that into an immediate
//! [`AwarenessError::Configuration`] instead of an opaque asynchronous
//! connection failure.

use std::collections::HashMap;

use awareness_types::{ApiKey, AwarenessError, GuardResult};

/// Registry of the API keys the application has configured.
///
/// # Example
///
/// ```
/// use awareness_guard::ApiKeyGuard;
/// use awareness_types::ApiKey;
///
/// let mut guard = ApiKeyGuard::new();
/// guard.register(ApiKey::Awareness, "AIzaSy-example");
///
/// assert!(guard.check(ApiKey::Awareness).is_ok());
///
/// guard.remove(ApiKey::Awareness);
/// assert!(guard.check(ApiKey::Awareness).is_err());
/// ```
#[derive(Default, Clone)]
pub struct ApiKeyGuard {
    keys: HashMap<ApiKey, String>,
}

impl ApiKeyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` for `key`, replacing any previous value.
    pub fn register(&mut self, key: ApiKey, value: impl Into<String>) {
        self.keys.insert(key, value.into());
    }

    /// Forget `key`.  No-ops if it was never registered.
    pub fn remove(&mut self, key: ApiKey) {
        self.keys.remove(&key);
    }

    pub fn is_configured(&self, key: ApiKey) -> bool {
        self.keys.get(&key).is_some_and(|v| !v.trim().is_empty())
    }

    /// Return `Ok(())` when a non-blank value is registered for `key`, or
    /// [`AwarenessError::Configuration`] otherwise.
    pub fn check(&self, key: ApiKey) -> GuardResult {
        if self.is_configured(key) {
            Ok(())
        } else {
            Err(AwarenessError::Configuration(format!(
                "missing API key: add a {} meta-data entry to the host configuration",
                key.meta_name()
            )))
        }
    }
}

impl std::fmt::Debug for ApiKeyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut configured: Vec<&ApiKey> = self.keys.keys().collect();
        configured.sort_by_key(|k| k.meta_name());
        f.debug_struct("ApiKeyGuard")
            .field("configured", &configured)
            .finish()
    }
}
