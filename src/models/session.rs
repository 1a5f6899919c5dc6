use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::{Profile, Role};

/// Identifies one browser. Sessions and redirect markers are scoped to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Device(pub Uuid);

impl Device {
    pub fn new() -> Self {
        Device(Uuid::new_v4())
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The signed-in identity of a device.
///
/// On the wire the profile fields sit at the top level beside
/// `timestamp` and `expires`, both epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(flatten)]
    pub user: Profile,
    /// When the session was created.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// When the session stops being valid.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires: DateTime<Utc>,
}

impl Session {
    /// Expiry is strict: a session is still valid at the instant it expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires
    }

    pub fn role(&self) -> Option<Role> {
        self.user.role
    }
}

/// The explicit per-request authentication context.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub device: Device,
    pub session: Session,
}

impl AuthContext {
    pub fn user(&self) -> &Profile {
        &self.session.user
    }
}
