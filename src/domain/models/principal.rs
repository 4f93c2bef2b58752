//! Authenticated principal and role-based authority checks
//!
//! Authorization decisions are pure functions over already-verified values:
//! the middleware verifies the token and builds a `Principal`; the service
//! layer never reads roles off a request object.

use serde::{Deserialize, Serialize};

/// Caller role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer
    User,
    /// Admin of a single agency
    AgencyAdmin,
    /// Platform operator
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::AgencyAdmin => "agency_admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "agency_admin" => Some(Self::AgencyAdmin),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }
}

/// The authenticated identity under which an operation executes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// User ID (token subject)
    pub id: String,
    pub role: Role,
    /// Set for agency admins; the agency they administer
    pub agency_id: Option<String>,
}

impl Principal {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            agency_id: None,
        }
    }

    pub fn agency_admin(id: impl Into<String>, agency_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::AgencyAdmin,
            agency_id: Some(agency_id.into()),
        }
    }

    pub fn super_admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::SuperAdmin,
            agency_id: None,
        }
    }

    /// Whether this principal may manage (decide on) reservations for
    /// vehicles owned by `vehicle_owner_agency`.
    ///
    /// Super admins manage everything; agency admins only their own
    /// agency's fleet; plain users never manage reservations.
    pub fn can_manage_reservations(&self, vehicle_owner_agency: &str) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::AgencyAdmin => self.agency_id.as_deref() == Some(vehicle_owner_agency),
            Role::User => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_manages_any_agency() {
        let p = Principal::super_admin("root");
        assert!(p.can_manage_reservations("agency-1"));
        assert!(p.can_manage_reservations("agency-2"));
    }

    #[test]
    fn agency_admin_manages_only_own_agency() {
        let p = Principal::agency_admin("admin-1", "agency-1");
        assert!(p.can_manage_reservations("agency-1"));
        assert!(!p.can_manage_reservations("agency-2"));
    }

    #[test]
    fn plain_user_manages_nothing() {
        let p = Principal::user("user-1");
        assert!(!p.can_manage_reservations("agency-1"));
    }

    #[test]
    fn agency_admin_without_agency_manages_nothing() {
        let p = Principal {
            id: "admin-1".into(),
            role: Role::AgencyAdmin,
            agency_id: None,
        };
        assert!(!p.can_manage_reservations("agency-1"));
    }

    #[test]
    fn role_parse_roundtrip() {
        for role in [Role::User, Role::AgencyAdmin, Role::SuperAdmin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("root"), None);
    }
}
