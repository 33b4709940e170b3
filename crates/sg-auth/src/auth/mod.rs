//! Authentication Aggregate
//!
//! Password hashing, identity-provider token verification, and the REST
//! endpoints built on top of them.

pub mod auth_api;
pub mod password_service;
pub mod token_verifier;

// Re-export main types
pub use auth_api::{auth_router, AuthApiState};
pub use password_service::{Argon2Config, PasswordService};
pub use token_verifier::{FederatedIdentity, IdTokenVerifier, ServiceCredential};
