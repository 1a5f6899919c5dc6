use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::repositories::{account::CredentialStore, session::SessionRepository};
use crate::services::{
    auth::AuthService,
    guard::AccessGuard,
    identity::{GoogleStub, IdentityProvider},
    session::SessionManager,
};
use crate::storage::{KeyValueStore, MemoryStore, RedisStore};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<Config>,
    /// The registered accounts.
    pub credentials: CredentialStore,
    /// Per-device sessions and redirect markers.
    pub sessions: SessionManager,
    /// The form flows.
    pub auth: AuthService,
    /// Page and role checks.
    pub guard: AccessGuard,
}

impl AppState {
    /// Creates a new `AppState`, connecting to Redis when configured.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match &config.redis_url {
            Some(url) => {
                let store = RedisStore::connect(url).await?;
                tracing::info!("✅ Redis store connected");
                Arc::new(store)
            }
            None => {
                tracing::warn!("⚠️ REDIS_URL not set, records are kept in memory only");
                Arc::new(MemoryStore::new())
            }
        };

        let identity = Arc::new(GoogleStub::new(config.latency.google));
        Ok(Self::with_parts(config.clone(), store, Arc::new(SystemClock), identity))
    }

    /// Assembles the state from explicit collaborators.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let credentials = CredentialStore::new(store.clone());
        let sessions = SessionManager::new(
            SessionRepository::new(store),
            clock,
            config.session_ttl,
        );
        let auth = AuthService::new(
            credentials.clone(),
            sessions.clone(),
            identity,
            config.latency,
        );
        let guard = AccessGuard::new(sessions.clone());

        AppState {
            config: Arc::new(config),
            credentials,
            sessions,
            auth,
            guard,
        }
    }
}
