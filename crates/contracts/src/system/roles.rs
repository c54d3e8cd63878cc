use serde::{Deserialize, Serialize};

/// Role of a user inside the community.
///
/// Every role except `SuperAdmin` is bound to exactly one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Resident,
    Security,
    Technician,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            UserRole::Resident => "resident",
            UserRole::Security => "security",
            UserRole::Technician => "technician",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "resident" => Some(UserRole::Resident),
            "security" => Some(UserRole::Security),
            "technician" => Some(UserRole::Technician),
            "admin" => Some(UserRole::Admin),
            "super_admin" => Some(UserRole::SuperAdmin),
            _ => None,
        }
    }

    pub const fn is_super_admin(self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }

    /// Whether a user bound to `own_project` may read `target_project`
    pub fn can_view_project(self, own_project: Option<&str>, target_project: &str) -> bool {
        self.is_super_admin() || own_project == Some(target_project)
    }

    /// Whether a user bound to `own_project` may toggle features of `target_project`
    pub fn can_manage_features(self, own_project: Option<&str>, target_project: &str) -> bool {
        match self {
            UserRole::SuperAdmin => true,
            UserRole::Admin => own_project == Some(target_project),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_admin_manages_any_project() {
        assert!(UserRole::SuperAdmin.can_manage_features(None, "p-1"));
        assert!(UserRole::SuperAdmin.can_view_project(Some("p-2"), "p-1"));
    }

    #[test]
    fn test_admin_is_limited_to_own_project() {
        assert!(UserRole::Admin.can_manage_features(Some("p-1"), "p-1"));
        assert!(!UserRole::Admin.can_manage_features(Some("p-1"), "p-2"));
        assert!(!UserRole::Admin.can_manage_features(None, "p-1"));
    }

    #[test]
    fn test_residents_can_read_but_not_manage() {
        assert!(UserRole::Resident.can_view_project(Some("p-1"), "p-1"));
        assert!(!UserRole::Resident.can_view_project(Some("p-1"), "p-2"));
        assert!(!UserRole::Resident.can_manage_features(Some("p-1"), "p-1"));
        assert!(!UserRole::Technician.can_manage_features(Some("p-1"), "p-1"));
    }

    #[test]
    fn test_parse_matches_wire_name() {
        for role in [
            UserRole::Resident,
            UserRole::Security,
            UserRole::Technician,
            UserRole::Admin,
            UserRole::SuperAdmin,
        ] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("guest"), None);
    }
}
