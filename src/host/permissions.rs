use std::collections::HashSet;

/// Name of an action guarded by the host's permission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission(&'static str);

impl Permission {
    pub const ADD_PORTAL_MEMBER: Self = Self("Add portal member");
    pub const MAIL_FORGOTTEN_PASSWORD: Self = Self("Mail forgotten password");
    pub const MANAGE_USERS: Self = Self("Manage users");

    pub const ALL: [Self; 3] = [
        Self::ADD_PORTAL_MEMBER,
        Self::MAIL_FORGOTTEN_PASSWORD,
        Self::MANAGE_USERS,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }

    /// Looks up a known permission by its name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.0.eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Host collaborator deciding whether the current caller
/// may perform an action.
pub trait PermissionGate: Send + Sync {
    fn check_permission(&self, permission: Permission) -> bool;
}

/// A gate with a fixed set of granted permissions.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    granted: HashSet<Permission>,
}

impl StaticPermissions {
    /// Grants nothing.
    #[must_use]
    pub fn deny_all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn allow_all() -> Self {
        Permission::ALL.into_iter().collect()
    }

    #[must_use]
    pub fn grant(mut self, permission: Permission) -> Self {
        self.granted.insert(permission);
        self
    }

    #[must_use]
    pub fn revoke(mut self, permission: Permission) -> Self {
        self.granted.remove(&permission);
        self
    }
}

impl FromIterator<Permission> for StaticPermissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            granted: iter.into_iter().collect(),
        }
    }
}

impl PermissionGate for StaticPermissions {
    fn check_permission(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }
}
