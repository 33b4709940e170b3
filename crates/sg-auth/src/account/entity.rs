//! Account Entity
//!
//! One document per signed-up user, regardless of how they authenticate.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the account proves its identity.
///
/// An account has exactly one provider at a time; a federated sign-in can
/// move a `Local` account to `Federated`, never the other way around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountProvider {
    /// Email + password, verified against the stored Argon2 hash
    Local,
    /// Identity-provider token sign-in
    Federated,
}

impl std::fmt::Display for AccountProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountProvider::Local => write!(f, "local"),
            AccountProvider::Federated => write!(f, "federated"),
        }
    }
}

/// Account document stored in the `accounts` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Display name, shown back to the client after sign-in
    pub full_name: String,

    /// Unique across the collection (store-level unique index)
    pub email: String,

    /// Argon2 PHC string; absent for federated accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    pub provider: AccountProvider,

    /// Audit fields
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// A password account. The caller hashes the password first; no plain
    /// password ever reaches this type.
    pub fn new_local(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            full_name: full_name.into(),
            email: email.into(),
            password_hash: Some(password_hash.into()),
            provider: AccountProvider::Local,
            created_at: now,
            updated_at: now,
        }
    }

    /// An account created by a first-time federated sign-in.
    pub fn new_federated(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            full_name: full_name.into(),
            email: email.into(),
            password_hash: None,
            provider: AccountProvider::Federated,
            created_at: now,
            updated_at: now,
        }
    }

    /// Switch the account to federated sign-in. The stored password hash is
    /// left untouched but stops being usable, since login checks the
    /// provider before the password.
    pub fn upgrade_to_federated(&mut self) {
        self.provider = AccountProvider::Federated;
        self.updated_at = Utc::now();
    }

    pub fn is_local(&self) -> bool {
        self.provider == AccountProvider::Local
    }

    pub fn is_federated(&self) -> bool {
        self.provider == AccountProvider::Federated
    }
}
