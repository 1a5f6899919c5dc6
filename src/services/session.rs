use std::sync::Arc;

use crate::{
    clock::Clock,
    config::SessionTtl,
    error::{AppError, Result},
    models::{
        account::Profile,
        session::{Device, Session},
    },
    repositories::session::SessionRepository,
};

/// What a device's session slot holds right now.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionLookup {
    Active(Session),
    Absent,
    /// The stored record could not be parsed.
    Corrupt,
    /// The stored record is past its expiry.
    Expired,
}

impl SessionLookup {
    fn reason(&self) -> Option<AppError> {
        match self {
            SessionLookup::Corrupt => Some(AppError::CorruptSession),
            SessionLookup::Expired => Some(AppError::Expired),
            _ => None,
        }
    }
}

/// Creates, validates and destroys the single session of each device.
#[derive(Clone)]
pub struct SessionManager {
    repo: SessionRepository,
    clock: Arc<dyn Clock>,
    ttl: SessionTtl,
}

impl SessionManager {
    pub fn new(repo: SessionRepository, clock: Arc<dyn Clock>, ttl: SessionTtl) -> Self {
        Self { repo, clock, ttl }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Stamps a session for `user` and stores it as the device's only
    /// session, replacing any previous one.
    pub async fn create_session(
        &self,
        device: &Device,
        user: Profile,
        remember: bool,
    ) -> Result<Session> {
        let now = self.clock.now();
        let lifetime = if remember {
            self.ttl.remembered
        } else {
            self.ttl.standard
        };

        let expires = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| AppError::Internal("Session expiry out of range".to_string()))?;

        let session = Session {
            user,
            timestamp: now,
            expires,
        };

        let raw = sonic_rs::to_string(&session)?;
        self.repo.save_raw(device, raw).await?;

        tracing::info!(
            "✅ Session created for {} on device {} (remember: {})",
            session.user.id,
            device,
            remember
        );
        Ok(session)
    }

    fn classify(&self, raw: Option<String>) -> SessionLookup {
        let Some(raw) = raw else {
            return SessionLookup::Absent;
        };
        match sonic_rs::from_str::<Session>(&raw) {
            Ok(session) if session.is_expired_at(self.clock.now()) => SessionLookup::Expired,
            Ok(session) => SessionLookup::Active(session),
            Err(e) => {
                tracing::debug!("Unparseable session record: {}", e);
                SessionLookup::Corrupt
            }
        }
    }

    /// Reports the state of the device's session without touching it.
    pub async fn inspect(&self, device: &Device) -> Result<SessionLookup> {
        Ok(self.classify(self.repo.load_raw(device).await?))
    }

    /// Returns the device's valid session.
    ///
    /// Corrupt and expired records are cleared and read as no session.
    pub async fn read_session(&self, device: &Device) -> Result<Option<Session>> {
        match self.inspect(device).await? {
            SessionLookup::Active(session) => Ok(Some(session)),
            SessionLookup::Absent => Ok(None),
            lookup => {
                if let Some(reason) = lookup.reason() {
                    tracing::warn!("❌ Clearing session on device {}: {}", device, reason);
                }
                self.repo.clear(device).await?;
                Ok(None)
            }
        }
    }

    /// Removes the device's session and pending redirect.
    pub async fn destroy_session(&self, device: &Device) -> Result<()> {
        self.repo.clear(device).await?;
        self.repo.clear_redirect(device).await?;
        tracing::info!("👋 Session destroyed on device {}", device);
        Ok(())
    }

    /// Remembers where the device was headed before it was sent to sign in.
    pub async fn remember_redirect(&self, device: &Device, url: &str) -> Result<()> {
        tracing::debug!("📌 Pending redirect for device {}: {}", device, url);
        self.repo.save_redirect(device, url).await
    }

    /// Returns and clears the device's pending redirect.
    pub async fn take_redirect(&self, device: &Device) -> Result<Option<String>> {
        let url = self.repo.load_redirect(device).await?;
        if url.is_some() {
            self.repo.clear_redirect(device).await?;
        }
        Ok(url)
    }

    /// Clears every stored session that is expired or unparseable.
    ///
    /// Returns how many records were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        let mut purged = 0;
        for key in self.repo.session_keys().await? {
            let lookup = self.classify(self.repo.load_raw_by_key(&key).await?);
            if matches!(lookup, SessionLookup::Expired | SessionLookup::Corrupt) {
                self.repo.clear_by_key(&key).await?;
                purged += 1;
            }
        }
        Ok(purged)
    }
}
