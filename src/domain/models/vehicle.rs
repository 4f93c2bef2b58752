//! Vehicle domain entity

use chrono::{DateTime, Utc};

/// A rentable vehicle owned by an agency
#[derive(Debug, Clone)]
pub struct Vehicle {
    /// Unique vehicle ID
    pub id: String,
    /// Owning agency
    pub agency_id: String,
    pub brand: String,
    pub model: String,
    /// Daily rate in minor currency units (e.g. cents)
    pub price_per_day: i64,
    /// Listing flag; unlisted vehicles are hidden from the catalog
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(
        agency_id: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
        price_per_day: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agency_id: agency_id.into(),
            brand: brand.into(),
            model: model.into(),
            price_per_day,
            available: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Catalog list filters (all optional, combined with AND)
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    pub agency_id: Option<String>,
    pub brand: Option<String>,
    /// Maximum daily rate in minor currency units
    pub max_price_per_day: Option<i64>,
    /// When true, only vehicles listed as available
    pub only_available: bool,
}

impl VehicleFilter {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        if self.only_available && !vehicle.available {
            return false;
        }
        if let Some(agency_id) = &self.agency_id {
            if &vehicle.agency_id != agency_id {
                return false;
            }
        }
        if let Some(brand) = &self.brand {
            if !vehicle.brand.eq_ignore_ascii_case(brand) {
                return false;
            }
        }
        if let Some(max) = self.max_price_per_day {
            if vehicle.price_per_day > max {
                return false;
            }
        }
        true
    }
}
