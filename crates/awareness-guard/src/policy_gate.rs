//! [`PolicyGate`] – the synchronous check every feature passes before the
//! core is allowed to open a connection.
//!
//! Each feature declares its [`FeatureRequirements`].  The gate checks them in
//! a fixed order and returns the first failure:
//!
//! 1. **Permissions** ([`PermissionSet`]): every listed runtime permission
//!    must be granted.
//! 2. **API keys** ([`ApiKeyGuard`]): every listed key must be configured.
//!
//! A failure is always [`AwarenessError::Configuration`][awareness_types::AwarenessError::Configuration]
//! and is raised before anything asynchronous starts.
//!
//! # Example
//!
//! ```
//! use awareness_guard::{ApiKeyGuard, FeatureRequirements, PermissionSet, PolicyGate};
//! use awareness_types::{ApiKey, Permission};
//!
//! const HEADPHONES: FeatureRequirements = FeatureRequirements {
//!     feature: "headphones",
//!     permissions: &[],
//!     api_keys: &[ApiKey::Awareness],
//! };
//!
//! let mut keys = ApiKeyGuard::new();
//! keys.register(ApiKey::Awareness, "AIza-example");
//! let gate = PolicyGate::new(keys, PermissionSet::new());
//!
//! assert!(gate.check(&HEADPHONES).is_ok());
//! ```

use awareness_types::{ApiKey, GuardResult, Permission};
use tracing::debug;

use crate::api_key_guard::ApiKeyGuard;
use crate::permission_set::PermissionSet;

/// Preconditions attached to one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRequirements {
    /// Name used in logs.
    pub feature: &'static str,
    pub permissions: &'static [Permission],
    pub api_keys: &'static [ApiKey],
}

/// Combines permission and API-key checks.
#[derive(Debug, Clone)]
pub struct PolicyGate {
    api_keys: ApiKeyGuard,
    permissions: PermissionSet,
}

impl PolicyGate {
    pub fn new(api_keys: ApiKeyGuard, permissions: PermissionSet) -> Self {
        Self {
            api_keys,
            permissions,
        }
    }

    /// Check every precondition of `requirements`.
    ///
    /// # Errors
    ///
    /// [`AwarenessError::Configuration`][awareness_types::AwarenessError::Configuration]
    /// for the first unmet precondition.
    pub fn check(&self, requirements: &FeatureRequirements) -> GuardResult {
        self.check_inner(requirements).inspect_err(|e| {
            debug!(feature = requirements.feature, error = %e, "precondition failed");
        })
    }

    fn check_inner(&self, requirements: &FeatureRequirements) -> GuardResult {
        for permission in requirements.permissions {
            self.permissions.check(*permission)?;
        }
        for key in requirements.api_keys {
            self.api_keys.check(*key)?;
        }
        Ok(())
    }
}
