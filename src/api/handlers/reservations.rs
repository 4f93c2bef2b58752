//! Reservation handlers: booking, availability probe, listing, status
//! decisions.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::dto::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::api::handlers::error_response;
use crate::api::validated_json::ValidatedJson;
use crate::application::{CreateReservation, ReservationService};
use crate::domain::{
    DomainError, InsuranceLevel, Principal, Reservation, ReservationOptions, ReservationStatus,
};

/// Application state for reservation handlers.
#[derive(Clone)]
pub struct ReservationState {
    pub service: Arc<ReservationService>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ReservationOptionsDto {
    #[serde(default)]
    pub gps: bool,
    #[serde(default)]
    pub extra_driver: bool,
    #[serde(default)]
    pub insurance: InsuranceLevel,
}

impl From<ReservationOptionsDto> for ReservationOptions {
    fn from(dto: ReservationOptionsDto) -> Self {
        Self {
            gps: dto.gps,
            extra_driver: dto.extra_driver,
            insurance: dto.insurance,
        }
    }
}

impl From<ReservationOptions> for ReservationOptionsDto {
    fn from(o: ReservationOptions) -> Self {
        Self {
            gps: o.gps,
            extra_driver: o.extra_driver,
            insurance: o.insurance,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    /// Total price in minor currency units, fixed at creation time
    pub total_price: i64,
    pub cin: String,
    pub phone: String,
    pub options: ReservationOptionsDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            vehicle_id: r.vehicle_id,
            start_date: r.start_date,
            end_date: r.end_date,
            status: r.status,
            total_price: r.total_price,
            cin: r.cin,
            phone: r.phone,
            options: r.options.into(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    #[validate(length(min = 1, message = "vehicleId is required"))]
    pub vehicle_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1, message = "cin is required"))]
    pub cin: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[serde(default)]
    pub options: ReservationOptionsDto,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AvailabilityRequest {
    #[validate(length(min = 1, message = "vehicleId is required"))]
    pub vehicle_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeStatusRequest {
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

/// Create a reservation
///
/// Books a vehicle for the authenticated user. The booked range is
/// inclusive of both dates and the price is fixed at creation time.
#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    request_body = CreateReservationRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Reservation created", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown vehicle"),
        (status = 409, description = "Vehicle not available for these dates")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> Result<
    (StatusCode, Json<ApiResponse<ReservationDto>>),
    (StatusCode, Json<ApiResponse<ReservationDto>>),
> {
    let created = state
        .service
        .create(
            &principal.id,
            CreateReservation {
                vehicle_id: request.vehicle_id,
                start_date: request.start_date,
                end_date: request.end_date,
                cin: request.cin,
                phone: request.phone,
                options: request.options.into(),
            },
        )
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

/// Check vehicle availability
///
/// Public probe; a positive answer is advisory only and can be
/// invalidated by a concurrent booking.
#[utoipa::path(
    post,
    path = "/api/v1/reservations/check",
    tag = "Reservations",
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Availability verdict", body = ApiResponse<AvailabilityResponse>),
        (status = 400, description = "Invalid date range")
    )
)]
pub async fn check_availability(
    State(state): State<ReservationState>,
    ValidatedJson(request): ValidatedJson<AvailabilityRequest>,
) -> Result<
    Json<ApiResponse<AvailabilityResponse>>,
    (StatusCode, Json<ApiResponse<AvailabilityResponse>>),
> {
    let available = state
        .service
        .check_availability(&request.vehicle_id, request.start_date, request.end_date)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(AvailabilityResponse {
        available,
    })))
}

/// List reservations visible to the caller
///
/// Customers see their own bookings, agency admins their agency's,
/// super admins everything.
#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    params(PaginationParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reservation list", body = ApiResponse<PaginatedResponse<ReservationDto>>)
    )
)]
pub async fn list_reservations(
    State(state): State<ReservationState>,
    Extension(principal): Extension<Principal>,
    Query(pagination): Query<PaginationParams>,
) -> Result<
    Json<ApiResponse<PaginatedResponse<ReservationDto>>>,
    (StatusCode, Json<ApiResponse<PaginatedResponse<ReservationDto>>>),
> {
    let reservations = state.service.list(&principal).await.map_err(error_response)?;
    let dtos: Vec<ReservationDto> = reservations.into_iter().map(ReservationDto::from).collect();
    Ok(Json(ApiResponse::success(PaginatedResponse::paginate(
        dtos,
        &pagination,
    ))))
}

/// Get one reservation by ID
#[utoipa::path(
    get,
    path = "/api/v1/reservations/{reservation_id}",
    tag = "Reservations",
    params(("reservation_id" = String, Path, description = "Reservation ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reservation details", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Foreign agency reservation"),
        (status = 404, description = "Not found or not visible")
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationState>,
    Extension(principal): Extension<Principal>,
    Path(reservation_id): Path<String>,
) -> Result<Json<ApiResponse<ReservationDto>>, (StatusCode, Json<ApiResponse<ReservationDto>>)> {
    let reservation = state
        .service
        .get(&reservation_id, &principal)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

/// Decide on a reservation
///
/// Accept, refuse, cancel or reset a reservation. Requires agency
/// admin authority over the vehicle's agency, or super admin.
#[utoipa::path(
    patch,
    path = "/api/v1/reservations/{reservation_id}/status",
    tag = "Reservations",
    params(("reservation_id" = String, Path, description = "Reservation ID")),
    request_body = ChangeStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Unknown status value"),
        (status = 403, description = "Not allowed for this agency"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn change_reservation_status(
    State(state): State<ReservationState>,
    Extension(principal): Extension<Principal>,
    Path(reservation_id): Path<String>,
    ValidatedJson(request): ValidatedJson<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<ReservationDto>>, (StatusCode, Json<ApiResponse<ReservationDto>>)> {
    let new_status = ReservationStatus::parse(&request.status)
        .ok_or_else(|| {
            error_response(DomainError::validation(format!(
                "Unknown status: {}",
                request.status
            )))
        })?;

    let updated = state
        .service
        .change_status(&reservation_id, new_status, &principal)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(updated.into())))
}
