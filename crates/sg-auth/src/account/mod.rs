//! Account Aggregate
//!
//! The account entity, its persistence seam and the reconciliation rules
//! that keep one account per email across local and federated sign-in.

pub mod entity;
pub mod reconciler;
pub mod repository;

// Re-export main types
pub use entity::{Account, AccountProvider};
pub use reconciler::AccountReconciler;
pub use repository::{AccountRepository, AccountStore, MemoryAccountStore};
