pub mod availability;
pub mod error;
pub mod models;
pub mod pricing;

// Re-export commonly used types
pub use availability::ranges_overlap;
pub use error::{DomainError, DomainResult};
pub use models::agency::{Agency, AgencyStatus};
pub use models::principal::{Principal, Role};
pub use models::reservation::{
    InsuranceLevel, Reservation, ReservationOptions, ReservationStatus,
};
pub use models::vehicle::{Vehicle, VehicleFilter};
pub use pricing::{quote, rental_days, PriceBreakdown, PricingConfig};
