//! Agency handlers (public, read-only)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::api::handlers::error_response;
use crate::api::handlers::vehicles::CatalogState;
use crate::domain::{Agency, AgencyStatus, DomainError};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgencyDto {
    pub id: String,
    pub name: String,
    pub city: String,
    pub status: AgencyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Agency> for AgencyDto {
    fn from(a: Agency) -> Self {
        Self {
            id: a.id,
            name: a.name,
            city: a.city,
            status: a.status,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Get one agency by ID
#[utoipa::path(
    get,
    path = "/api/v1/agencies/{agency_id}",
    tag = "Agencies",
    params(("agency_id" = String, Path, description = "Agency ID")),
    responses(
        (status = 200, description = "Agency details", body = ApiResponse<AgencyDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_agency(
    State(state): State<CatalogState>,
    Path(agency_id): Path<String>,
) -> Result<Json<ApiResponse<AgencyDto>>, (StatusCode, Json<ApiResponse<AgencyDto>>)> {
    let agency = state
        .storage
        .get_agency(&agency_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(DomainError::not_found("Agency", "id", &agency_id)))?;

    Ok(Json(ApiResponse::success(agency.into())))
}
