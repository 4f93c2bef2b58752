//! Reservation lifecycle service
//!
//! The only component with write authority over reservation state. Every
//! operation re-reads current store state; nothing is cached between
//! requests.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::availability::AvailabilityChecker;
use crate::domain::{
    pricing, DomainError, DomainResult, Principal, Reservation, ReservationOptions,
    ReservationStatus, Role, PricingConfig,
};
use crate::infrastructure::Storage;

/// Input for the create operation; `user_id` comes from the authenticated
/// principal, never from the request body.
#[derive(Debug, Clone)]
pub struct CreateReservation {
    pub vehicle_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cin: String,
    pub phone: String,
    pub options: ReservationOptions,
}

pub struct ReservationService {
    storage: Arc<dyn Storage>,
    availability: AvailabilityChecker,
    pricing: PricingConfig,
}

impl ReservationService {
    pub fn new(storage: Arc<dyn Storage>, pricing: PricingConfig) -> Self {
        let availability = AvailabilityChecker::new(Arc::clone(&storage));
        Self {
            storage,
            availability,
            pricing,
        }
    }

    /// Create a reservation: validate, check the calendar, price, persist.
    ///
    /// The store insert is conditional, so a conflict can still surface
    /// there when two creates race past the availability check.
    pub async fn create(
        &self,
        user_id: &str,
        request: CreateReservation,
    ) -> DomainResult<Reservation> {
        if request.vehicle_id.trim().is_empty() {
            return Err(DomainError::validation("vehicleId is required"));
        }
        if request.cin.trim().is_empty() {
            return Err(DomainError::validation("cin is required"));
        }
        if request.phone.trim().is_empty() {
            return Err(DomainError::validation("phone is required"));
        }
        if request.start_date > request.end_date {
            return Err(DomainError::validation(
                "startDate must be on or before endDate",
            ));
        }

        let vehicle = self
            .storage
            .get_vehicle(&request.vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", "id", &request.vehicle_id))?;

        let available = self
            .availability
            .is_available(&vehicle.id, request.start_date, request.end_date)
            .await?;
        if !available {
            return Err(DomainError::conflict(
                "Vehicle is not available for these dates",
            ));
        }

        let breakdown = pricing::quote(
            request.start_date,
            request.end_date,
            vehicle.price_per_day,
            request.options,
            &self.pricing,
        );

        let reservation = Reservation::new(
            user_id,
            &vehicle.id,
            request.start_date,
            request.end_date,
            breakdown.total,
            request.cin,
            request.phone,
            request.options,
        );

        let created = self.storage.create_reservation(reservation).await?;
        info!(
            reservation_id = %created.id,
            vehicle_id = %created.vehicle_id,
            total = created.total_price,
            "reservation created"
        );
        Ok(created)
    }

    /// Change a reservation's status under role authority and the state
    /// machine. Only `status` (and `updated_at`) are written.
    pub async fn change_status(
        &self,
        reservation_id: &str,
        new_status: ReservationStatus,
        principal: &Principal,
    ) -> DomainResult<Reservation> {
        let reservation = self
            .storage
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", "id", reservation_id))?;

        let vehicle = self
            .storage
            .get_vehicle(&reservation.vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", "id", &reservation.vehicle_id))?;

        if !principal.can_manage_reservations(&vehicle.agency_id) {
            return Err(DomainError::forbidden(
                "Not allowed to manage reservations for this agency",
            ));
        }

        if !reservation.status.can_transition_to(new_status) {
            return Err(DomainError::conflict(format!(
                "Invalid status transition: {} -> {}",
                reservation.status, new_status
            )));
        }

        let updated = self
            .storage
            .update_reservation_status(reservation_id, new_status)
            .await?;
        info!(
            reservation_id = %updated.id,
            from = %reservation.status,
            to = %updated.status,
            "reservation status changed"
        );
        Ok(updated)
    }

    /// Role-scoped listing, enforced server-side regardless of any caller
    /// supplied parameters.
    pub async fn list(&self, principal: &Principal) -> DomainResult<Vec<Reservation>> {
        match principal.role {
            Role::User => self.storage.list_reservations_for_user(&principal.id).await,
            Role::AgencyAdmin => {
                let agency_id = principal.agency_id.as_deref().ok_or_else(|| {
                    DomainError::forbidden("Agency admin has no agency assigned")
                })?;
                self.storage.list_reservations_for_agency(agency_id).await
            }
            Role::SuperAdmin => self.storage.list_all_reservations().await,
        }
    }

    /// Role-scoped single read. Out-of-scope records look like they do not
    /// exist to customers; foreign agency admins get a forbidden error.
    pub async fn get(
        &self,
        reservation_id: &str,
        principal: &Principal,
    ) -> DomainResult<Reservation> {
        let reservation = self
            .storage
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", "id", reservation_id))?;

        match principal.role {
            Role::SuperAdmin => Ok(reservation),
            Role::User => {
                if reservation.user_id == principal.id {
                    Ok(reservation)
                } else {
                    Err(DomainError::not_found("Reservation", "id", reservation_id))
                }
            }
            Role::AgencyAdmin => {
                let vehicle = self
                    .storage
                    .get_vehicle(&reservation.vehicle_id)
                    .await?
                    .ok_or_else(|| {
                        DomainError::not_found("Vehicle", "id", &reservation.vehicle_id)
                    })?;
                if principal.can_manage_reservations(&vehicle.agency_id) {
                    Ok(reservation)
                } else {
                    Err(DomainError::forbidden(
                        "Not allowed to view reservations for this agency",
                    ))
                }
            }
        }
    }

    /// Public availability probe used by the UI before booking. Read-only,
    /// no authorization.
    pub async fn check_availability(
        &self,
        vehicle_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<bool> {
        if start > end {
            return Err(DomainError::validation(
                "startDate must be on or before endDate",
            ));
        }
        self.availability.is_available(vehicle_id, start, end).await
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InsuranceLevel, Vehicle};
    use crate::infrastructure::InMemoryStorage;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn pricing_config() -> PricingConfig {
        PricingConfig {
            gps_fee: 3_000,
            extra_driver_fee: 5_000,
            premium_insurance_per_day: 1_500,
            currency: "MAD".to_string(),
        }
    }

    /// Storage seeded with one vehicle per agency: v1 (agency-1, 200.00/day)
    /// and v2 (agency-2, 150.00/day).
    async fn seeded() -> (Arc<InMemoryStorage>, ReservationService) {
        let storage = Arc::new(InMemoryStorage::new());
        let mut v1 = Vehicle::new("agency-1", "Dacia", "Logan", 20_000);
        v1.id = "v1".into();
        let mut v2 = Vehicle::new("agency-2", "Renault", "Clio", 15_000);
        v2.id = "v2".into();
        storage.save_vehicle(v1).await.unwrap();
        storage.save_vehicle(v2).await.unwrap();

        let service = ReservationService::new(
            Arc::clone(&storage) as Arc<dyn Storage>,
            pricing_config(),
        );
        (storage, service)
    }

    fn request(vehicle_id: &str, start: &str, end: &str) -> CreateReservation {
        CreateReservation {
            vehicle_id: vehicle_id.into(),
            start_date: date(start),
            end_date: date(end),
            cin: "AB123456".into(),
            phone: "+212600000000".into(),
            options: ReservationOptions::default(),
        }
    }

    #[tokio::test]
    async fn create_prices_and_persists_pending() {
        let (_, service) = seeded().await;
        let r = service
            .create("user-1", request("v1", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.total_price, 40_000); // 2 days at 200.00
        assert_eq!(r.user_id, "user-1");
    }

    #[tokio::test]
    async fn create_includes_addons_in_price() {
        let (_, service) = seeded().await;
        let mut req = request("v1", "2024-06-01", "2024-06-03");
        req.options = ReservationOptions {
            gps: true,
            extra_driver: false,
            insurance: InsuranceLevel::Premium,
        };
        let r = service.create("user-1", req).await.unwrap();
        // 3 days * 200.00 + GPS 30.00 + premium 15.00 * 3
        assert_eq!(r.total_price, 60_000 + 3_000 + 4_500);
    }

    #[tokio::test]
    async fn create_rejects_missing_fields() {
        let (_, service) = seeded().await;

        let mut req = request("v1", "2024-06-01", "2024-06-02");
        req.cin = "  ".into();
        let err = service.create("user-1", req).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut req = request("v1", "2024-06-01", "2024-06-02");
        req.phone = String::new();
        let err = service.create("user-1", req).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_inverted_dates() {
        let (_, service) = seeded().await;
        let err = service
            .create("user-1", request("v1", "2024-06-05", "2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_unknown_vehicle() {
        let (_, service) = seeded().await;
        let err = service
            .create("user-1", request("ghost", "2024-06-01", "2024-06-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn create_rejects_overlapping_dates() {
        let (_, service) = seeded().await;
        service
            .create("user-1", request("v1", "2024-06-01", "2024-06-03"))
            .await
            .unwrap();

        let err = service
            .create("user-2", request("v1", "2024-06-03", "2024-06-05"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // other vehicle unaffected
        service
            .create("user-2", request("v2", "2024-06-03", "2024-06-05"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn agency_admin_decides_own_agency_only() {
        let (_, service) = seeded().await;
        let r = service
            .create("user-1", request("v1", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();

        let foreign_admin = Principal::agency_admin("admin-2", "agency-2");
        let err = service
            .change_status(&r.id, ReservationStatus::Accepted, &foreign_admin)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let owner_admin = Principal::agency_admin("admin-1", "agency-1");
        let updated = service
            .change_status(&r.id, ReservationStatus::Accepted, &owner_admin)
            .await
            .unwrap();
        assert_eq!(updated.status, ReservationStatus::Accepted);
    }

    #[tokio::test]
    async fn super_admin_decides_any_reservation() {
        let (_, service) = seeded().await;
        let r = service
            .create("user-1", request("v1", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();

        let updated = service
            .change_status(&r.id, ReservationStatus::Refused, &Principal::super_admin("root"))
            .await
            .unwrap();
        assert_eq!(updated.status, ReservationStatus::Refused);
    }

    #[tokio::test]
    async fn plain_user_may_not_change_status() {
        let (_, service) = seeded().await;
        let r = service
            .create("user-1", request("v1", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();

        let err = service
            .change_status(&r.id, ReservationStatus::Cancelled, &Principal::user("user-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn cancelled_is_terminal_even_for_super_admin() {
        let (_, service) = seeded().await;
        let root = Principal::super_admin("root");
        let r = service
            .create("user-1", request("v1", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();
        service
            .change_status(&r.id, ReservationStatus::Cancelled, &root)
            .await
            .unwrap();

        let err = service
            .change_status(&r.id, ReservationStatus::Pending, &root)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn accepted_can_be_reset_to_pending() {
        let (_, service) = seeded().await;
        let admin = Principal::agency_admin("admin-1", "agency-1");
        let r = service
            .create("user-1", request("v1", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();

        service
            .change_status(&r.id, ReservationStatus::Accepted, &admin)
            .await
            .unwrap();
        let reset = service
            .change_status(&r.id, ReservationStatus::Pending, &admin)
            .await
            .unwrap();
        assert_eq!(reset.status, ReservationStatus::Pending);
    }

    #[tokio::test]
    async fn change_status_leaves_price_untouched() {
        let (_, service) = seeded().await;
        let r = service
            .create("user-1", request("v1", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();
        let updated = service
            .change_status(&r.id, ReservationStatus::Accepted, &Principal::super_admin("root"))
            .await
            .unwrap();
        assert_eq!(updated.total_price, r.total_price);
        assert_eq!(updated.start_date, r.start_date);
        assert_eq!(updated.end_date, r.end_date);
    }

    #[tokio::test]
    async fn list_scopes_by_role() {
        let (_, service) = seeded().await;
        service
            .create("user-1", request("v1", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();
        service
            .create("user-2", request("v2", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();

        let own = service.list(&Principal::user("user-1")).await.unwrap();
        assert_eq!(own.len(), 1);
        assert!(own.iter().all(|r| r.user_id == "user-1"));

        let agency = service
            .list(&Principal::agency_admin("admin-2", "agency-2"))
            .await
            .unwrap();
        assert_eq!(agency.len(), 1);
        assert_eq!(agency[0].vehicle_id, "v2");

        let all = service.list(&Principal::super_admin("root")).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn get_hides_foreign_reservation_from_user() {
        let (_, service) = seeded().await;
        let r = service
            .create("user-1", request("v1", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();

        let err = service
            .get(&r.id, &Principal::user("user-2"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        service.get(&r.id, &Principal::user("user-1")).await.unwrap();
    }

    #[tokio::test]
    async fn probe_validates_date_order() {
        let (_, service) = seeded().await;
        let err = service
            .check_availability("v1", date("2024-06-05"), date("2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn booking_flow_end_to_end() {
        // Vehicle at 200.00/day; 2-day booking totals 400.00; the probe
        // flips as the reservation is created and then refused.
        let (_, service) = seeded().await;

        let r = service
            .create("user-1", request("v1", "2024-06-01", "2024-06-02"))
            .await
            .unwrap();
        assert_eq!(r.total_price, 40_000);
        assert_eq!(r.status, ReservationStatus::Pending);

        assert!(!service
            .check_availability("v1", date("2024-06-02"), date("2024-06-03"))
            .await
            .unwrap());

        service
            .change_status(
                &r.id,
                ReservationStatus::Refused,
                &Principal::agency_admin("admin-1", "agency-1"),
            )
            .await
            .unwrap();

        assert!(service
            .check_availability("v1", date("2024-06-02"), date("2024-06-03"))
            .await
            .unwrap());
    }
}
