use std::sync::Arc;

use crate::{
    error::Result,
    models::session::Device,
    storage::KeyValueStore,
};

/// Prefix of the per-device session keys.
pub const SESSION_PREFIX: &str = "curexpert_user:";
/// Prefix of the per-device pending redirect keys.
pub const REDIRECT_PREFIX: &str = "curexpert_redirect:";

pub fn session_key(device: &Device) -> String {
    format!("{}{}", SESSION_PREFIX, device)
}

pub fn redirect_key(device: &Device) -> String {
    format!("{}{}", REDIRECT_PREFIX, device)
}

/// Raw access to the session slot and redirect marker of each device.
///
/// Values are handed back undecoded so the session manager can tell a
/// corrupt record from an absent one.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load_raw(&self, device: &Device) -> Result<Option<String>> {
        self.store.get(&session_key(device)).await
    }

    pub async fn save_raw(&self, device: &Device, raw: String) -> Result<()> {
        self.store.put(&session_key(device), raw).await
    }

    pub async fn clear(&self, device: &Device) -> Result<()> {
        self.store.remove(&session_key(device)).await
    }

    /// Every stored session key, across devices.
    pub async fn session_keys(&self) -> Result<Vec<String>> {
        self.store.list(SESSION_PREFIX).await
    }

    pub async fn load_raw_by_key(&self, key: &str) -> Result<Option<String>> {
        self.store.get(key).await
    }

    pub async fn clear_by_key(&self, key: &str) -> Result<()> {
        self.store.remove(key).await
    }

    pub async fn save_redirect(&self, device: &Device, url: &str) -> Result<()> {
        self.store.put(&redirect_key(device), url.to_string()).await
    }

    pub async fn load_redirect(&self, device: &Device) -> Result<Option<String>> {
        self.store.get(&redirect_key(device)).await
    }

    pub async fn clear_redirect(&self, device: &Device) -> Result<()> {
        self.store.remove(&redirect_key(device)).await
    }
}
