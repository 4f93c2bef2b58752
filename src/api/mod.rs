//! REST API: routes, handlers, DTOs and request validation

pub mod dto;
pub mod handlers;
pub mod router;
pub mod validated_json;

pub use router::{create_api_router, ApiDoc};
pub use validated_json::ValidatedJson;
