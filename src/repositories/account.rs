use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, Result},
    models::account::{same_email, Account, Profile},
    storage::KeyValueStore,
};

/// The key holding the JSON array of every registered account.
pub const ACCOUNTS_KEY: &str = "curexpert_users";

/// The registered accounts, stored as one list under [`ACCOUNTS_KEY`].
///
/// Lookups are linear scans. Every write rewrites the whole list; writers
/// are serialized so a duplicate check and its append cannot interleave
/// with another writer's.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Loads every account. A missing list is an empty list.
    pub async fn list(&self) -> Result<Vec<Account>> {
        match self.store.get(ACCOUNTS_KEY).await? {
            Some(raw) => Ok(sonic_rs::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, accounts: &[Account]) -> Result<()> {
        let raw = sonic_rs::to_string(accounts)?;
        self.store.put(ACCOUNTS_KEY, raw).await
    }

    /// Appends `account` unless its email is already registered.
    pub async fn register(&self, account: Account) -> Result<Account> {
        let _guard = self.write_lock.lock().await;

        let mut accounts = self.list().await?;
        if accounts.iter().any(|a| same_email(a.email(), account.email())) {
            return Err(AppError::DuplicateEmail);
        }

        accounts.push(account.clone());
        self.save(&accounts).await?;

        tracing::info!("✅ Account registered: {}", account.profile.id);
        Ok(account)
    }

    /// Finds the account whose email and password both match.
    ///
    /// Passwords are compared in plaintext.
    pub async fn find_by_credentials(&self, email: &str, password: &str) -> Result<Account> {
        self.list()
            .await?
            .into_iter()
            .find(|a| same_email(a.email(), email) && a.password.as_deref() == Some(password))
            .ok_or(AppError::InvalidCredentials)
    }

    /// Finds the account registered under `email`.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|a| same_email(a.email(), email)))
    }

    /// Records a profile handed over by an external identity provider.
    ///
    /// A new email is appended as a passwordless account. A known email
    /// keeps its id, role, password and registration date while the
    /// provider's fields overwrite the rest and `last_login` is stamped.
    pub async fn merge_external(&self, incoming: Profile, now: DateTime<Utc>) -> Result<Profile> {
        let _guard = self.write_lock.lock().await;

        let mut accounts = self.list().await?;
        let merged = match accounts
            .iter_mut()
            .find(|a| same_email(a.email(), &incoming.email))
        {
            Some(existing) => {
                let profile = &mut existing.profile;
                profile.name = incoming.name;
                profile.firstname = incoming.firstname;
                profile.lastname = incoming.lastname;
                profile.picture = incoming.picture;
                profile.verified = incoming.verified;
                profile.locale = incoming.locale;
                profile.provider = incoming.provider;
                profile.oauth_id = incoming.oauth_id;
                profile.last_login = Some(now);
                tracing::info!("🔄 External profile merged into account: {}", profile.id);
                profile.clone()
            }
            None => {
                tracing::info!("✅ Account created from external profile: {}", incoming.id);
                accounts.push(Account {
                    profile: incoming.clone(),
                    password: None,
                });
                incoming
            }
        };

        self.save(&accounts).await?;
        Ok(merged)
    }
}
