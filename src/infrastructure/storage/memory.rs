//! In-memory storage implementation

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;

use super::Storage;
use crate::domain::{
    ranges_overlap, Agency, DomainError, DomainResult, Reservation, ReservationStatus, Vehicle,
    VehicleFilter,
};

/// In-memory storage for development and testing
pub struct InMemoryStorage {
    agencies: DashMap<String, Agency>,
    vehicles: DashMap<String, Vehicle>,
    reservations: DashMap<String, Reservation>,
    /// Serializes the overlap check and insert inside `create_reservation`
    insert_guard: Mutex<()>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            agencies: DashMap::new(),
            vehicles: DashMap::new(),
            reservations: DashMap::new(),
            insert_guard: Mutex::new(()),
        }
    }

    fn blocking_overlaps(&self, vehicle_id: &str, start: NaiveDate, end: NaiveDate) -> Vec<Reservation> {
        self.reservations
            .iter()
            .filter(|r| {
                r.vehicle_id == vehicle_id
                    && r.status.blocks_availability()
                    && ranges_overlap(r.start_date, r.end_date, start, end)
            })
            .map(|r| r.clone())
            .collect()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_agency(&self, agency: Agency) -> DomainResult<()> {
        self.agencies.insert(agency.id.clone(), agency);
        Ok(())
    }

    async fn get_agency(&self, id: &str) -> DomainResult<Option<Agency>> {
        Ok(self.agencies.get(id).map(|a| a.clone()))
    }

    async fn list_agencies(&self) -> DomainResult<Vec<Agency>> {
        Ok(self.agencies.iter().map(|a| a.value().clone()).collect())
    }

    async fn save_vehicle(&self, vehicle: Vehicle) -> DomainResult<()> {
        self.vehicles.insert(vehicle.id.clone(), vehicle);
        Ok(())
    }

    async fn get_vehicle(&self, id: &str) -> DomainResult<Option<Vehicle>> {
        Ok(self.vehicles.get(id).map(|v| v.clone()))
    }

    async fn list_vehicles(&self, filter: &VehicleFilter) -> DomainResult<Vec<Vehicle>> {
        Ok(self
            .vehicles
            .iter()
            .filter(|v| filter.matches(v))
            .map(|v| v.value().clone())
            .collect())
    }

    async fn create_reservation(&self, reservation: Reservation) -> DomainResult<Reservation> {
        // No awaits while the guard is held; the check and the insert are
        // indivisible from the point of view of other creates.
        let _guard = self
            .insert_guard
            .lock()
            .map_err(|_| DomainError::Storage("reservation insert guard poisoned".into()))?;

        if !self
            .blocking_overlaps(
                &reservation.vehicle_id,
                reservation.start_date,
                reservation.end_date,
            )
            .is_empty()
        {
            return Err(DomainError::conflict(
                "Vehicle is not available for these dates",
            ));
        }

        self.reservations
            .insert(reservation.id.clone(), reservation.clone());
        Ok(reservation)
    }

    async fn get_reservation(&self, id: &str) -> DomainResult<Option<Reservation>> {
        Ok(self.reservations.get(id).map(|r| r.clone()))
    }

    async fn update_reservation_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> DomainResult<Reservation> {
        // The entry lock is held across the check and the write, so two
        // racing status changes cannot both observe the same starting
        // status.
        let mut entry = self
            .reservations
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Reservation", "id", id))?;
        if !entry.status.can_transition_to(status) {
            return Err(DomainError::conflict(format!(
                "Invalid status transition: {} -> {}",
                entry.status, status
            )));
        }
        entry.status = status;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn find_blocking_reservations(
        &self,
        vehicle_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<Reservation>> {
        Ok(self.blocking_overlaps(vehicle_id, start, end))
    }

    async fn list_reservations_for_user(&self, user_id: &str) -> DomainResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.clone())
            .collect())
    }

    async fn list_reservations_for_agency(
        &self,
        agency_id: &str,
    ) -> DomainResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| {
                self.vehicles
                    .get(&r.vehicle_id)
                    .map(|v| v.agency_id == agency_id)
                    .unwrap_or(false)
            })
            .map(|r| r.clone())
            .collect())
    }

    async fn list_all_reservations(&self) -> DomainResult<Vec<Reservation>> {
        Ok(self.reservations.iter().map(|r| r.clone()).collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────
