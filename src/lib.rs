//! # RentFleet Reservation Service
//!
//! Multi-agency vehicle rental reservation service.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core entities, availability and pricing rules
//! - **application**: Reservation lifecycle and availability services
//! - **infrastructure**: Storage backends (in-memory and SQLite via SeaORM)
//! - **api**: REST API with Swagger documentation
//! - **auth**: JWT authentication and role middleware

pub mod api;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, DatabaseStorage};

// Re-export API router
pub use api::create_api_router;
