pub mod common;

pub use common::{ApiResponse, PaginatedResponse, PaginationParams};
