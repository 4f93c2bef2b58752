//! Storage trait definitions

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Agency, DomainResult, Reservation, ReservationStatus, Vehicle, VehicleFilter,
};

/// Storage trait for persistence operations
///
/// The reservation store is the single shared mutable resource; services
/// receive it as `Arc<dyn Storage>` so tests can substitute the in-memory
/// implementation.
#[async_trait]
pub trait Storage: Send + Sync {
    // Agency operations
    async fn save_agency(&self, agency: Agency) -> DomainResult<()>;
    async fn get_agency(&self, id: &str) -> DomainResult<Option<Agency>>;
    async fn list_agencies(&self) -> DomainResult<Vec<Agency>>;

    // Vehicle operations
    async fn save_vehicle(&self, vehicle: Vehicle) -> DomainResult<()>;
    async fn get_vehicle(&self, id: &str) -> DomainResult<Option<Vehicle>>;
    async fn list_vehicles(&self, filter: &VehicleFilter) -> DomainResult<Vec<Vehicle>>;

    // Reservation operations
    //
    // `create_reservation` is a conditional insert: it atomically fails
    // with `DomainError::Conflict` when a pending or accepted reservation
    // for the same vehicle overlaps the requested range. This closes the
    // check-then-act window between an availability probe and the insert.
    async fn create_reservation(&self, reservation: Reservation) -> DomainResult<Reservation>;
    async fn get_reservation(&self, id: &str) -> DomainResult<Option<Reservation>>;

    /// Writes `status` (and `updated_at`) only. The store re-checks the
    /// transition table against the current row atomically with the
    /// write and fails with `DomainError::Conflict` when the move is not
    /// allowed, so two racing status changes cannot both start from the
    /// same state.
    async fn update_reservation_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> DomainResult<Reservation>;

    /// Reservations on `vehicle_id` whose status blocks the calendar and
    /// whose inclusive range intersects `[start, end]`.
    async fn find_blocking_reservations(
        &self,
        vehicle_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<Reservation>>;

    async fn list_reservations_for_user(&self, user_id: &str) -> DomainResult<Vec<Reservation>>;
    async fn list_reservations_for_agency(&self, agency_id: &str)
        -> DomainResult<Vec<Reservation>>;
    async fn list_all_reservations(&self) -> DomainResult<Vec<Reservation>>;
}
