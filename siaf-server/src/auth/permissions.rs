//! Permission definitions
//!
//! Two roles. `admin` holds `all`; `user` gets module permissions for
//! day-to-day work. The admin-only permissions are never granted to `user`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Every permission a route can require
pub const ALL_PERMISSIONS: &[&str] = &[
    "inventory:read",
    "inventory:write",
    "incidents:read",
    "incidents:write",
    "maintenance:read",
    "maintenance:write",
    "responsive_forms:read",
    "responsive_forms:write",
    "requisitions:read",
    "requisitions:write",
    "clients:read",
    "clients:write",
    "reports:view",
];

/// Admin-only permissions
pub const ADMIN_ONLY_PERMISSIONS: &[&str] = &[
    "users:manage",      // user management
    "inventory:delete",  // retire assets
    "categories:manage", // asset categories
    "audit:read",        // audit log
    "system:backup",     // database export
    "all",
];

pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

pub const DEFAULT_USER_PERMISSIONS: &[&str] = &[
    "inventory:read",
    "inventory:write",
    "incidents:*",
    "maintenance:*",
    "responsive_forms:*",
    "requisitions:*",
    "clients:*",
    "reports:view",
];

/// Permissions for a role name
pub fn get_default_permissions(role: &str) -> Vec<String> {
    let perms = match role {
        ROLE_ADMIN => DEFAULT_ADMIN_PERMISSIONS,
        ROLE_USER => DEFAULT_USER_PERMISSIONS,
        _ => &[],
    };
    perms.iter().map(|s| s.to_string()).collect()
}

pub fn is_valid_role(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_USER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CurrentUser;

    fn with_role(role: &str) -> CurrentUser {
        CurrentUser {
            id: "user:1".into(),
            username: "u".into(),
            full_name: "U".into(),
            role: role.into(),
            department: String::new(),
            permissions: get_default_permissions(role),
        }
    }

    #[test]
    fn test_user_role_covers_every_module_permission() {
        let user = with_role(ROLE_USER);
        for perm in ALL_PERMISSIONS {
            assert!(user.has_permission(perm), "{perm}");
        }
    }

    #[test]
    fn test_user_role_lacks_admin_only_permissions() {
        let user = with_role(ROLE_USER);
        for perm in ADMIN_ONLY_PERMISSIONS.iter().filter(|p| **p != "all") {
            assert!(!user.has_permission(perm), "{perm}");
        }
    }

    #[test]
    fn test_unknown_role_has_nothing() {
        assert!(get_default_permissions("guest").is_empty());
        assert!(!is_valid_role("guest"));
    }
}
