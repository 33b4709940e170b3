//! Signet Authentication
//!
//! A minimal authentication backend:
//! - Local signup and login (Argon2id password hashing)
//! - Federated sign-in against an identity provider's RS256 ID tokens
//! - One `Account` per email, reconciled across both sign-in paths
//!
//! No sessions or tokens are issued; endpoints return profile data only.
//!
//! ## Module Organization (Aggregate-based)
//!
//! - `account` - The account entity, store seam and reconciliation rules
//! - `auth` - Password hashing, token verification and the REST endpoints
//! - `shared` - Error taxonomy, health probes, index bootstrap

// Core aggregate
pub mod account;

// Authentication
pub mod auth;

// Shared infrastructure
pub mod shared;

// Re-export common types from shared
pub use shared::error::{AuthError, ErrorResponse, Result};

// Re-export main entity types for convenience
pub use account::{Account, AccountProvider, AccountReconciler};
pub use account::{AccountRepository, AccountStore, MemoryAccountStore};

// Re-export services and routers
pub use auth::{auth_router, AuthApiState};
pub use auth::{Argon2Config, PasswordService};
pub use auth::{FederatedIdentity, IdTokenVerifier, ServiceCredential};
pub use shared::health_api::{health_router, HealthState};
pub use shared::indexes::initialize_indexes;
