//! Vehicle catalog handlers (public, read-only)

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::api::handlers::error_response;
use crate::domain::{DomainError, Vehicle, VehicleFilter};
use crate::infrastructure::Storage;

/// Application state for catalog handlers.
#[derive(Clone)]
pub struct CatalogState {
    pub storage: Arc<dyn Storage>,
}

/// A vehicle as shown in the public catalog
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VehicleDto {
    pub id: String,
    pub agency_id: String,
    pub brand: String,
    pub model: String,
    /// Daily rate in minor currency units
    pub price_per_day: i64,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleDto {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            agency_id: v.agency_id,
            brand: v.brand,
            model: v.model,
            price_per_day: v.price_per_day,
            available: v.available,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

/// Catalog list filters
#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct VehicleListQuery {
    /// Restrict to one agency's fleet
    pub agency_id: Option<String>,
    /// Exact brand match (case-insensitive)
    pub brand: Option<String>,
    /// Maximum daily rate in minor currency units
    pub max_price_per_day: Option<i64>,
    /// When true, only vehicles listed as available
    #[serde(default)]
    pub only_available: bool,
}

/// List catalog vehicles
///
/// Public endpoint; supports filtering and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    params(VehicleListQuery, PaginationParams),
    responses(
        (status = 200, description = "Vehicle list", body = ApiResponse<PaginatedResponse<VehicleDto>>)
    )
)]
pub async fn list_vehicles(
    State(state): State<CatalogState>,
    Query(query): Query<VehicleListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<
    Json<ApiResponse<PaginatedResponse<VehicleDto>>>,
    (StatusCode, Json<ApiResponse<PaginatedResponse<VehicleDto>>>),
> {
    let filter = VehicleFilter {
        agency_id: query.agency_id,
        brand: query.brand,
        max_price_per_day: query.max_price_per_day,
        only_available: query.only_available,
    };

    let vehicles = state
        .storage
        .list_vehicles(&filter)
        .await
        .map_err(error_response)?;

    let dtos: Vec<VehicleDto> = vehicles.into_iter().map(VehicleDto::from).collect();
    Ok(Json(ApiResponse::success(PaginatedResponse::paginate(
        dtos,
        &pagination,
    ))))
}

/// Get one vehicle by ID
#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{vehicle_id}",
    tag = "Vehicles",
    params(("vehicle_id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle details", body = ApiResponse<VehicleDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_vehicle(
    State(state): State<CatalogState>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<ApiResponse<VehicleDto>>, (StatusCode, Json<ApiResponse<VehicleDto>>)> {
    let vehicle = state
        .storage
        .get_vehicle(&vehicle_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(DomainError::not_found("Vehicle", "id", &vehicle_id)))?;

    Ok(Json(ApiResponse::success(vehicle.into())))
}
