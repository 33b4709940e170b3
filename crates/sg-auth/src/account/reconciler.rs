//! Account Reconciler
//!
//! Decides what happens to the account record on each sign-up or federated
//! sign-in, given what already exists for that email:
//!
//! | Event              | Existing account | Outcome                        |
//! |--------------------|------------------|--------------------------------|
//! | local signup       | none             | create local account           |
//! | local signup       | any              | `DuplicateEmail`               |
//! | federated sign-in  | none             | create federated account       |
//! | federated sign-in  | federated        | reuse as-is                    |
//! | federated sign-in  | local            | switch provider to federated,  |
//! |                    |                  | or `DuplicateEmail` when the   |
//! |                    |                  | upgrade policy is disabled     |
//!
//! The upgrade leaves the stored password hash in place but password login
//! stops working for that account, because login checks the provider first.

use std::sync::Arc;
use tracing::info;

use super::entity::{Account, AccountProvider};
use super::repository::AccountStore;
use crate::auth::token_verifier::FederatedIdentity;
use crate::shared::error::{AuthError, Result};

pub struct AccountReconciler {
    accounts: Arc<dyn AccountStore>,
    upgrade_on_federated_signin: bool,
}

impl AccountReconciler {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            accounts,
            upgrade_on_federated_signin: true,
        }
    }

    /// Set whether a federated sign-in may take over a local account
    /// (default: yes).
    pub fn with_upgrade_on_federated_signin(mut self, enabled: bool) -> Self {
        self.upgrade_on_federated_signin = enabled;
        self
    }

    /// Create a local account. There is no read-before-write; a concurrent
    /// signup for the same email loses on the store's unique index.
    pub async fn signup_local(
        &self,
        full_name: &str,
        email: &str,
        password_hash: String,
    ) -> Result<Account> {
        let account = Account::new_local(full_name, email, password_hash);
        self.accounts.insert(&account).await?;
        info!(email = %account.email, "created local account");
        Ok(account)
    }

    /// Land a verified federated identity on an account, creating or
    /// upgrading as needed.
    pub async fn reconcile_federated(&self, identity: &FederatedIdentity) -> Result<Account> {
        match self.accounts.find_by_email(&identity.email).await? {
            None => {
                let account = Account::new_federated(&identity.display_name, &identity.email);
                self.accounts.insert(&account).await?;
                info!(email = %account.email, "created federated account");
                Ok(account)
            }
            Some(account) if account.is_federated() => Ok(account),
            Some(mut account) => {
                if !self.upgrade_on_federated_signin {
                    return Err(AuthError::DuplicateEmail);
                }
                account.upgrade_to_federated();
                self.accounts
                    .update_provider(&account.id, AccountProvider::Federated)
                    .await?;
                info!(email = %account.email, "switched local account to federated sign-in");
                Ok(account)
            }
        }
    }
}
