pub mod services;

pub use services::{AvailabilityChecker, CreateReservation, ReservationService};
