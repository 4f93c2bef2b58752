//! SeaORM implementation of the Storage trait

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::debug;

use super::entities::{agency, reservation, vehicle};
use crate::domain::{
    Agency, AgencyStatus, DomainError, DomainResult, InsuranceLevel, Reservation,
    ReservationOptions, ReservationStatus, Vehicle, VehicleFilter,
};
use crate::infrastructure::storage::Storage;

pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

fn agency_to_domain(m: agency::Model) -> DomainResult<Agency> {
    Ok(Agency {
        status: AgencyStatus::parse(&m.status)
            .ok_or_else(|| DomainError::Storage(format!("unknown agency status: {}", m.status)))?,
        id: m.id,
        name: m.name,
        city: m.city,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn vehicle_to_domain(m: vehicle::Model) -> Vehicle {
    Vehicle {
        id: m.id,
        agency_id: m.agency_id,
        brand: m.brand,
        model: m.model,
        price_per_day: m.price_per_day,
        available: m.available,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn reservation_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    let status = ReservationStatus::parse(&m.status).ok_or_else(|| {
        DomainError::Storage(format!("unknown reservation status: {}", m.status))
    })?;
    let insurance = InsuranceLevel::parse(&m.option_insurance).ok_or_else(|| {
        DomainError::Storage(format!("unknown insurance level: {}", m.option_insurance))
    })?;
    Ok(Reservation {
        id: m.id,
        user_id: m.user_id,
        vehicle_id: m.vehicle_id,
        start_date: m.start_date,
        end_date: m.end_date,
        status,
        total_price: m.total_price,
        cin: m.cin,
        phone: m.phone,
        options: ReservationOptions {
            gps: m.option_gps,
            extra_driver: m.option_extra_driver,
            insurance,
        },
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn reservation_to_active(r: &Reservation) -> reservation::ActiveModel {
    reservation::ActiveModel {
        id: Set(r.id.clone()),
        user_id: Set(r.user_id.clone()),
        vehicle_id: Set(r.vehicle_id.clone()),
        start_date: Set(r.start_date),
        end_date: Set(r.end_date),
        status: Set(r.status.as_str().to_string()),
        total_price: Set(r.total_price),
        cin: Set(r.cin.clone()),
        phone: Set(r.phone.clone()),
        option_gps: Set(r.options.gps),
        option_extra_driver: Set(r.options.extra_driver),
        option_insurance: Set(r.options.insurance.as_str().to_string()),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    }
}

const BLOCKING_STATUSES: [&str; 2] = ["pending", "accepted"];

// ── Storage impl ────────────────────────────────────────────────

#[async_trait]
impl Storage for DatabaseStorage {
    async fn save_agency(&self, a: Agency) -> DomainResult<()> {
        let model = agency::ActiveModel {
            id: Set(a.id),
            name: Set(a.name),
            city: Set(a.city),
            status: Set(a.status.as_str().to_string()),
            created_at: Set(a.created_at),
            updated_at: Set(a.updated_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn get_agency(&self, id: &str) -> DomainResult<Option<Agency>> {
        let model = agency::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(agency_to_domain).transpose()
    }

    async fn list_agencies(&self) -> DomainResult<Vec<Agency>> {
        let models = agency::Entity::find()
            .order_by_asc(agency::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(agency_to_domain).collect()
    }

    async fn save_vehicle(&self, v: Vehicle) -> DomainResult<()> {
        let model = vehicle::ActiveModel {
            id: Set(v.id),
            agency_id: Set(v.agency_id),
            brand: Set(v.brand),
            model: Set(v.model),
            price_per_day: Set(v.price_per_day),
            available: Set(v.available),
            created_at: Set(v.created_at),
            updated_at: Set(v.updated_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn get_vehicle(&self, id: &str) -> DomainResult<Option<Vehicle>> {
        let model = vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(vehicle_to_domain))
    }

    async fn list_vehicles(&self, filter: &VehicleFilter) -> DomainResult<Vec<Vehicle>> {
        let mut query = vehicle::Entity::find();
        if let Some(agency_id) = &filter.agency_id {
            query = query.filter(vehicle::Column::AgencyId.eq(agency_id));
        }
        if let Some(brand) = &filter.brand {
            // Case-insensitive, matching the in-memory filter
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(vehicle::Column::Brand)))
                    .eq(brand.to_lowercase()),
            );
        }
        if let Some(max) = filter.max_price_per_day {
            query = query.filter(vehicle::Column::PricePerDay.lte(max));
        }
        if filter.only_available {
            query = query.filter(vehicle::Column::Available.eq(true));
        }
        let models = query
            .order_by_asc(vehicle::Column::Brand)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(vehicle_to_domain).collect())
    }

    async fn create_reservation(&self, r: Reservation) -> DomainResult<Reservation> {
        debug!("Creating reservation {} for vehicle {}", r.id, r.vehicle_id);

        // The overlap check and the insert run in one transaction, so two
        // racing creates cannot both observe a free calendar.
        let txn = self.db.begin().await.map_err(db_err)?;

        let conflicts = reservation::Entity::find()
            .filter(reservation::Column::VehicleId.eq(&r.vehicle_id))
            .filter(reservation::Column::Status.is_in(BLOCKING_STATUSES))
            .filter(reservation::Column::StartDate.lte(r.end_date))
            .filter(reservation::Column::EndDate.gte(r.start_date))
            .count(&txn)
            .await
            .map_err(db_err)?;

        if conflicts > 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::conflict(
                "Vehicle is not available for these dates",
            ));
        }

        reservation_to_active(&r).insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(r)
    }

    async fn get_reservation(&self, id: &str) -> DomainResult<Option<Reservation>> {
        let model = reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(reservation_to_domain).transpose()
    }

    async fn update_reservation_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> DomainResult<Reservation> {
        // Read, guard and write in one transaction so two racing status
        // changes cannot both observe the same starting status. The later
        // one sees the committed state and fails the transition check.
        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = reservation::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Reservation", "id", id))?;

        let current = ReservationStatus::parse(&existing.status).ok_or_else(|| {
            DomainError::Storage(format!("unknown reservation status: {}", existing.status))
        })?;
        if !current.can_transition_to(status) {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::conflict(format!(
                "Invalid status transition: {} -> {}",
                current, status
            )));
        }

        let mut active: reservation::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        reservation_to_domain(updated)
    }

    async fn find_blocking_reservations(
        &self,
        vehicle_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::VehicleId.eq(vehicle_id))
            .filter(reservation::Column::Status.is_in(BLOCKING_STATUSES))
            .filter(reservation::Column::StartDate.lte(end))
            .filter(reservation::Column::EndDate.gte(start))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(reservation_to_domain).collect()
    }

    async fn list_reservations_for_user(&self, user_id: &str) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(reservation_to_domain).collect()
    }

    async fn list_reservations_for_agency(
        &self,
        agency_id: &str,
    ) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .join(JoinType::InnerJoin, reservation::Relation::Vehicle.def())
            .filter(vehicle::Column::AgencyId.eq(agency_id))
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(reservation_to_domain).collect()
    }

    async fn list_all_reservations(&self) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(reservation_to_domain).collect()
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::infrastructure::database::migrator::Migrator;

    async fn storage() -> DatabaseStorage {
        // One pooled connection: an in-memory SQLite database exists per
        // connection, so a larger pool would see empty databases.
        let mut opts = sea_orm::ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        DatabaseStorage::new(db)
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn seed_vehicle(storage: &DatabaseStorage, brand: &str) -> Vehicle {
        let agency = Agency::new("AutoPlus", "Casablanca");
        let vehicle = Vehicle::new(&agency.id, brand, "Logan", 20_000);
        storage.save_agency(agency).await.unwrap();
        storage.save_vehicle(vehicle.clone()).await.unwrap();
        vehicle
    }

    #[tokio::test]
    async fn brand_filter_ignores_case() {
        let storage = storage().await;
        seed_vehicle(&storage, "Dacia").await;

        let filter = VehicleFilter {
            brand: Some("dacia".into()),
            ..Default::default()
        };
        let found = storage.list_vehicles(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].brand, "Dacia");

        let filter = VehicleFilter {
            brand: Some("DACIA".into()),
            ..Default::default()
        };
        assert_eq!(storage.list_vehicles(&filter).await.unwrap().len(), 1);

        let filter = VehicleFilter {
            brand: Some("renault".into()),
            ..Default::default()
        };
        assert!(storage.list_vehicles(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn conditional_insert_rejects_overlap() {
        let storage = storage().await;
        let vehicle = seed_vehicle(&storage, "Dacia").await;

        let booking = Reservation::new(
            "user-1",
            &vehicle.id,
            date("2024-06-01"),
            date("2024-06-03"),
            40_000,
            "AB123456",
            "+212600000000",
            ReservationOptions::default(),
        );
        storage.create_reservation(booking).await.unwrap();

        let overlapping = Reservation::new(
            "user-2",
            &vehicle.id,
            date("2024-06-03"),
            date("2024-06-05"),
            40_000,
            "CD654321",
            "+212611111111",
            ReservationOptions::default(),
        );
        let err = storage.create_reservation(overlapping).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn stale_status_write_is_rejected() {
        // A cancelled reservation cannot be overwritten by a decision
        // that raced against the cancellation.
        let storage = storage().await;
        let vehicle = seed_vehicle(&storage, "Dacia").await;

        let created = storage
            .create_reservation(Reservation::new(
                "user-1",
                &vehicle.id,
                date("2024-06-01"),
                date("2024-06-03"),
                40_000,
                "AB123456",
                "+212600000000",
                ReservationOptions::default(),
            ))
            .await
            .unwrap();

        storage
            .update_reservation_status(&created.id, ReservationStatus::Cancelled)
            .await
            .unwrap();

        let err = storage
            .update_reservation_status(&created.id, ReservationStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let stored = storage
            .get_reservation(&created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ReservationStatus::Cancelled);
    }
}
