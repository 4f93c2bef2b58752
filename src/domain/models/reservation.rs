//! Reservation domain entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Awaiting a decision by the agency
    Pending,
    /// Accepted by the agency admin
    Accepted,
    /// Refused by the agency admin
    Refused,
    /// Cancelled; terminal, never leaves this state
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Refused => "refused",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "refused" => Some(Self::Refused),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether a reservation in this status blocks the vehicle's calendar.
    /// Refused and cancelled reservations free the dates up again.
    pub fn blocks_availability(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// The reservation state machine.
    ///
    /// Pending may move to any decision; accepted and refused may be reset
    /// back to pending by the agency; cancelled is terminal. The reset
    /// asymmetry (cancelled cannot be reset) mirrors the admin console's
    /// observed behavior and is pending product confirmation.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Refused) | (Pending, Cancelled) | (Accepted, Pending) | (Refused, Pending)
        )
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Insurance level selected at booking time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InsuranceLevel {
    #[default]
    None,
    Basic,
    Premium,
}

impl InsuranceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "basic" => Some(Self::Basic),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }
}

/// Optional add-ons selected by the renter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationOptions {
    /// GPS unit (flat fee)
    #[serde(default)]
    pub gps: bool,
    /// Additional registered driver (flat fee)
    #[serde(default)]
    pub extra_driver: bool,
    /// Insurance level; premium is billed per rental day
    #[serde(default)]
    pub insurance: InsuranceLevel,
}

/// Vehicle reservation; the central entity of the booking flow.
///
/// After creation only `status` and `updated_at` ever change.
#[derive(Debug, Clone)]
pub struct Reservation {
    /// Unique reservation ID
    pub id: String,
    /// Customer who requested the booking
    pub user_id: String,
    /// Reserved vehicle
    pub vehicle_id: String,
    /// First rental day (inclusive)
    pub start_date: NaiveDate,
    /// Last rental day (inclusive)
    pub end_date: NaiveDate,
    /// Current status
    pub status: ReservationStatus,
    /// Total price in minor currency units, fixed at creation
    pub total_price: i64,
    /// Renter identity document number (CIN)
    pub cin: String,
    /// Renter contact phone
    pub phone: String,
    /// Selected add-ons
    pub options: ReservationOptions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: impl Into<String>,
        vehicle_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        total_price: i64,
        cin: impl Into<String>,
        phone: impl Into<String>,
        options: ReservationOptions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            vehicle_id: vehicle_id.into(),
            start_date,
            end_date,
            status: ReservationStatus::Pending,
            total_price,
            cin: cin.into(),
            phone: phone.into(),
            options,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this reservation blocks other bookings of the same vehicle
    pub fn blocks_availability(&self) -> bool {
        self.status.blocks_availability()
    }
}

// ── Tests ──────────────────────────────────────────────────────
