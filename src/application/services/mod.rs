pub mod availability;
pub mod reservation;

pub use availability::AvailabilityChecker;
pub use reservation::{CreateReservation, ReservationService};
