//! `awareness-guard` – fail-fast preconditions
//!
//! Runs before any connection to the sensing service is attempted.  Nothing
//! here is asynchronous: a feature either passes its checks or the caller gets
//! an [`AwarenessError::Configuration`][awareness_types::AwarenessError::Configuration]
//! straight away.
//!
//! # Modules
//!
//! - [`api_key_guard`] – [`ApiKeyGuard`][api_key_guard::ApiKeyGuard]: the
//!   API keys the application has configured.
//! - [`permission_set`] – [`PermissionSet`][permission_set::PermissionSet]:
//!   runtime permissions granted to the application.
//! - [`policy_gate`] – [`PolicyGate`][policy_gate::PolicyGate]: checks a
//!   feature's [`FeatureRequirements`][policy_gate::FeatureRequirements]
//!   (permissions, then keys) in one call.

pub mod api_key_guard;
pub mod permission_set;
pub mod policy_gate;

pub use api_key_guard::ApiKeyGuard;
pub use permission_set::PermissionSet;
pub use policy_gate::{FeatureRequirements, PolicyGate};
