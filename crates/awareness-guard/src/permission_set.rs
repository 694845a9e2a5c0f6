//! [`PermissionSet`] – runtime permissions the application has been granted.

use std::collections::HashSet;

use awareness_types::{AwarenessError, GuardResult, Permission};

/// The set of [`Permission`]s granted to the application.
#[derive(Debug, Default, Clone)]
pub struct PermissionSet {
    granted: HashSet<Permission>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `permission`.  Duplicate grants are silently ignored.
    pub fn grant(&mut self, permission: Permission) {
        self.granted.insert(permission);
    }

    /// Revoke `permission`.  No-ops if it was never granted.
    pub fn revoke(&mut self, permission: Permission) {
        self.granted.remove(&permission);
    }

    pub fn check(&self, permission: Permission) -> GuardResult {
        if self.granted.contains(&permission) {
            Ok(())
        } else {
            Err(AwarenessError::Configuration(format!(
                "permission {permission} has not been granted"
            )))
        }
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            granted: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_permission_passes() {
        let mut perms = PermissionSet::new();
        perms.grant(Permission::FineLocation);
        assert!(perms.check(Permission::FineLocation).is_ok());
    }

    #[test]
    fn ungranted_permission_is_denied() {
        let perms = PermissionSet::new();
        let result = perms.check(Permission::ActivityRecognition);
        assert!(matches!(result, Err(AwarenessError::Configuration(_))));
    }

    #[test]
    fn revoke_removes_permission() {
        let mut perms: PermissionSet = [Permission::FineLocation].into_iter().collect();
        perms.revoke(Permission::FineLocation);
        assert!(perms.check(Permission::FineLocation).is_err());
        perms.revoke(Permission::FineLocation);
    }
}
