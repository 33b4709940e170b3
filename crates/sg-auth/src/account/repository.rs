//! Account Store
//!
//! MongoDB is the production backing store; the in-memory variant backs
//! tests and local runs without a database. The unique index on `email` is
//! the only duplicate guard: `insert` is attempted directly and a
//! unique-index violation comes back as `DuplicateEmail`, so two concurrent
//! signups for the same email resolve to exactly one account.

use async_trait::async_trait;
use bson::oid::ObjectId;
use mongodb::{bson::doc, Collection, Database};
use parking_lot::RwLock;

use super::entity::{Account, AccountProvider};
use crate::shared::error::{AuthError, Result};

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account; a second account with the same email fails
    /// with `DuplicateEmail`.
    async fn insert(&self, account: &Account) -> Result<()>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Persist a provider switch. Only `provider` and `updatedAt` change;
    /// the rest of the document, including any stored password hash, stays
    /// as it is.
    async fn update_provider(&self, id: &ObjectId, provider: AccountProvider) -> Result<()>;
}

// ============================================================================
// MongoDB Account Store
// ============================================================================

pub struct AccountRepository {
    collection: Collection<Account>,
}

impl AccountRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("accounts"),
        }
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn insert(&self, account: &Account) -> Result<()> {
        match self.collection.insert_one(account).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key_error(&e) => Err(AuthError::DuplicateEmail),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn update_provider(&self, id: &ObjectId, provider: AccountProvider) -> Result<()> {
        let update = doc! {
            "$set": {
                "provider": bson::to_bson(&provider)?,
                "updatedAt": bson::DateTime::now(),
            }
        };
        self.collection.update_one(doc! { "_id": id }, update).await?;
        Ok(())
    }
}

/// Check if a MongoDB error is a unique index violation (server code 11000)
fn is_duplicate_key_error(error: &mongodb::error::Error) -> bool {
    if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(write_error)) =
        error.kind.as_ref()
    {
        return write_error.code == 11000;
    }
    false
}

// ============================================================================
// In-Memory Account Store (for testing/development)
// ============================================================================

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write();
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(AuthError::DuplicateEmail);
        }
        accounts.push(account.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read();
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn update_provider(&self, id: &ObjectId, provider: AccountProvider) -> Result<()> {
        let mut accounts = self.accounts.write();
        if let Some(account) = accounts.iter_mut().find(|a| &a.id == id) {
            account.provider = provider;
            account.updated_at = chrono::Utc::now();
        }
        Ok(())
    }
}
