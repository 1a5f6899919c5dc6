//! External identity providers.
//!
//! Only a stand-in for Google exists: it waits a fixed delay and hands back
//! a fabricated profile. No OAuth exchange takes place.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::account::Profile;

/// Resolves the visitor's identity with a third party.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name, e.g. `"google"`.
    fn name(&self) -> &'static str;

    /// Runs the provider's sign-in and returns the profile it vouches for.
    async fn authenticate(&self, now: DateTime<Utc>) -> Result<Profile>;
}

/// Fabricates the same Gmail profile on every call.
#[derive(Debug, Clone)]
pub struct GoogleStub {
    delay: Duration,
}

impl GoogleStub {
    pub const EMAIL: &'static str = "user@gmail.com";

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl IdentityProvider for GoogleStub {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn authenticate(&self, now: DateTime<Utc>) -> Result<Profile> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(Profile {
            id: format!("google_{}", Uuid::new_v4().simple()),
            email: Self::EMAIL.to_string(),
            name: "Gmail User".to_string(),
            firstname: Some("Gmail".to_string()),
            lastname: Some("User".to_string()),
            role: None,
            created_at: now,
            last_login: Some(now),
            picture: Some("https://via.placeholder.com/150".to_string()),
            verified: Some(true),
            locale: Some("en".to_string()),
            provider: Some(self.name().to_string()),
            oauth_id: Some(format!("google_{}", now.timestamp_millis())),
        })
    }
}
