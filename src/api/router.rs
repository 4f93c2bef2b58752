//! API Router with Swagger UI

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::dto::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::api::handlers::{agencies, health, reservations, vehicles};
use crate::application::ReservationService;
use crate::auth::middleware::{admin_middleware, auth_middleware, AuthState};
use crate::auth::JwtConfig;
use crate::infrastructure::Storage;

/// Unified state for all routes. Axum extracts the specific handler
/// state via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub storage: Arc<dyn Storage>,
    pub reservations: Arc<ReservationService>,
    pub auth: AuthState,
}

impl FromRef<ApiState> for vehicles::CatalogState {
    fn from_ref(s: &ApiState) -> Self {
        vehicles::CatalogState {
            storage: Arc::clone(&s.storage),
        }
    }
}

impl FromRef<ApiState> for reservations::ReservationState {
    fn from_ref(s: &ApiState) -> Self {
        reservations::ReservationState {
            service: Arc::clone(&s.reservations),
        }
    }
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        s.auth.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Catalog
        vehicles::list_vehicles,
        vehicles::get_vehicle,
        agencies::get_agency,
        // Reservations
        reservations::create_reservation,
        reservations::check_availability,
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::change_reservation_status,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            PaginationParams,
            PaginatedResponse<vehicles::VehicleDto>,
            PaginatedResponse<reservations::ReservationDto>,
            // Catalog
            vehicles::VehicleDto,
            agencies::AgencyDto,
            // Reservations
            reservations::ReservationDto,
            reservations::ReservationOptionsDto,
            reservations::CreateReservationRequest,
            reservations::AvailabilityRequest,
            reservations::AvailabilityResponse,
            reservations::ChangeStatusRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check, for uptime and readiness monitoring."),
        (name = "Vehicles", description = "Public vehicle catalog. Daily rates are stored in minor currency units."),
        (name = "Agencies", description = "Rental agencies (tenants). Each agency owns a fleet of vehicles."),
        (name = "Reservations", description = "Vehicle bookings. Booked ranges are inclusive of both dates; \
            statuses: `pending`, `accepted`, `refused`, `cancelled`. Accepting, refusing, cancelling and \
            resetting require agency admin or super admin authority."),
    ),
    info(
        title = "RentFleet Reservation API",
        version = "1.0.0",
        description = "REST API for multi-agency vehicle rental reservations.

## Authentication

Obtain a JWT from your identity provider and pass it in the
`Authorization: Bearer <token>` header. The vehicle catalog and the
availability probe are public; everything else requires a token.

## Response format

All responses use a standard envelope:
```json
{\"success\": true, \"data\": {...}, \"error\": null}
```

On failure:
```json
{\"success\": false, \"data\": null, \"error\": \"description\"}
```

## Pagination

List endpoints accept `page` (1-based) and `limit` (default 50, max 100)."
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    storage: Arc<dyn Storage>,
    reservations_service: Arc<ReservationService>,
    jwt_config: JwtConfig,
) -> Router {
    let middleware_state = AuthState { jwt_config };

    let state = ApiState {
        storage,
        reservations: reservations_service,
        auth: middleware_state.clone(),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public catalog and probe routes
    let public_routes = Router::new()
        .route("/vehicles", get(vehicles::list_vehicles))
        .route("/vehicles/{vehicle_id}", get(vehicles::get_vehicle))
        .route("/agencies/{agency_id}", get(agencies::get_agency))
        .route("/reservations/check", post(reservations::check_availability))
        .with_state(state.clone());

    // Status decisions require admin authority on top of authentication
    let admin_routes = Router::new()
        .route(
            "/reservations/{reservation_id}/status",
            patch(reservations::change_reservation_status),
        )
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Authenticated reservation routes
    let protected_routes = Router::new()
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/reservations/{reservation_id}",
            get(reservations::get_reservation),
        )
        .layer(middleware::from_fn_with_state(
            middleware_state,
            auth_middleware,
        ))
        .with_state(state);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .nest("/api/v1", public_routes)
        .nest("/api/v1", admin_routes)
        .nest("/api/v1", protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────
