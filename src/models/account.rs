use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The category of an account. Controls which content a visitor sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Provider,
    Partner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Patient, Role::Provider, Role::Partner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Provider => "provider",
            Role::Partner => "partner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s.trim())
            .ok_or(())
    }
}

/// The public part of an account: everything but the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// The account's identifier.
    pub id: String,
    /// The email address. Unique across accounts.
    pub email: String,
    /// The full display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    /// Accounts created through Google carry no role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Set to `"google"` for accounts created by the Google sign-in path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_id: Option<String>,
}

impl Profile {
    /// The first name, falling back to the first word of the display name.
    pub fn first_name(&self) -> String {
        match self.firstname.as_deref() {
            Some(first) if !first.is_empty() => first.to_string(),
            _ => self.name.split(' ').next().unwrap_or_default().to_string(),
        }
    }

    /// The last name, falling back to everything after the first word of
    /// the display name.
    pub fn last_name(&self) -> String {
        match self.lastname.as_deref() {
            Some(last) if !last.is_empty() => last.to_string(),
            _ => self.name.split(' ').skip(1).collect::<Vec<_>>().join(" "),
        }
    }
}

/// A registered account as kept in the credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(flatten)]
    pub profile: Profile,
    /// ⚠️ Stored and compared in plaintext. Not a trust boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Account {
    pub fn email(&self) -> &str {
        &self.profile.email
    }

    /// Drops the password, keeping only the public fields.
    pub fn into_profile(self) -> Profile {
        self.profile
    }
}

/// Compares two email addresses the way the credential store does:
/// surrounding whitespace ignored, case-insensitive.
pub fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
