//! Availability checker

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::DomainResult;
use crate::infrastructure::Storage;

/// Decides whether a vehicle is free for a requested date range.
///
/// A vehicle is free when no pending or accepted reservation overlaps the
/// range under the closed-interval test. Unknown vehicle ids are reported
/// as free: vehicle existence is validated earlier in the create flow, and
/// the public probe deliberately does not leak which ids exist.
///
/// Read-only; a store failure propagates instead of defaulting to
/// "available".
#[derive(Clone)]
pub struct AvailabilityChecker {
    storage: Arc<dyn Storage>,
}

impl AvailabilityChecker {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn is_available(
        &self,
        vehicle_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<bool> {
        let blocking = self
            .storage
            .find_blocking_reservations(vehicle_id, start, end)
            .await?;
        Ok(blocking.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Reservation, ReservationOptions};
    use crate::infrastructure::InMemoryStorage;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn storage_with_booking(start: &str, end: &str) -> Arc<InMemoryStorage> {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .create_reservation(Reservation::new(
                "user-1",
                "v1",
                date(start),
                date(end),
                40_000,
                "AB123456",
                "+212600000000",
                ReservationOptions::default(),
            ))
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn empty_store_is_always_available() {
        let checker = AvailabilityChecker::new(Arc::new(InMemoryStorage::new()));
        assert!(checker
            .is_available("v1", date("2024-06-01"), date("2024-06-03"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn overlapping_booking_blocks() {
        let storage = storage_with_booking("2024-06-01", "2024-06-03").await;
        let checker = AvailabilityChecker::new(storage);
        assert!(!checker
            .is_available("v1", date("2024-06-03"), date("2024-06-05"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn disjoint_range_is_available() {
        let storage = storage_with_booking("2024-06-01", "2024-06-03").await;
        let checker = AvailabilityChecker::new(storage);
        assert!(checker
            .is_available("v1", date("2024-06-04"), date("2024-06-06"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn unknown_vehicle_is_silently_available() {
        let storage = storage_with_booking("2024-06-01", "2024-06-03").await;
        let checker = AvailabilityChecker::new(storage);
        assert!(checker
            .is_available("no-such-vehicle", date("2024-06-01"), date("2024-06-03"))
            .await
            .unwrap());
    }
}
