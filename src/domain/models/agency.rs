//! Agency domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Agency account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AgencyStatus {
    Active,
    Suspended,
}

impl AgencyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

impl std::fmt::Display for AgencyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tenant that owns a fleet of vehicles
#[derive(Debug, Clone)]
pub struct Agency {
    /// Unique agency ID
    pub id: String,
    pub name: String,
    pub city: String,
    pub status: AgencyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agency {
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            city: city.into(),
            status: AgencyStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_agency_is_active() {
        let a = Agency::new("AutoPlus", "Casablanca");
        assert_eq!(a.status, AgencyStatus::Active);
    }

    #[test]
    fn status_parse_roundtrip() {
        for status in [AgencyStatus::Active, AgencyStatus::Suspended] {
            assert_eq!(AgencyStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AgencyStatus::parse("banned"), None);
    }
}
