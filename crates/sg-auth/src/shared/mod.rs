//! Shared Module
//!
//! Cross-cutting concerns: the error taxonomy, common API types, health
//! probes and index bootstrap.

pub mod api_common;
pub mod error;
pub mod health_api;
pub mod indexes;

// Re-export commonly used items
pub use api_common::MessageResponse;
pub use error::{AuthError, ErrorResponse, Result};
pub use health_api::{health_router, HealthState};
pub use indexes::initialize_indexes;
