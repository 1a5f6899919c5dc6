use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::{
    config::SimulatedLatency,
    error::Result,
    models::{
        account::{Account, Profile},
        session::{Device, Session},
    },
    repositories::account::CredentialStore,
    services::{
        guard::{DASHBOARD_PAGE, is_local_target},
        identity::IdentityProvider,
        session::SessionManager,
    },
    validation::auth::{SignInForm, SignUpForm},
};

/// A successful sign-in of any kind.
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub message: &'static str,
    pub session: Session,
    /// Where the visitor goes next.
    pub redirect_to: String,
}

/// Drives the sign-in, sign-up and Google forms.
#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialStore,
    sessions: SessionManager,
    identity: Arc<dyn IdentityProvider>,
    latency: SimulatedLatency,
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

impl AuthService {
    pub fn new(
        credentials: CredentialStore,
        sessions: SessionManager,
        identity: Arc<dyn IdentityProvider>,
        latency: SimulatedLatency,
    ) -> Self {
        Self {
            credentials,
            sessions,
            identity,
            latency,
        }
    }

    /// The pending redirect if one was recorded, else the dashboard.
    async fn next_page(&self, device: &Device) -> Result<String> {
        Ok(self
            .sessions
            .take_redirect(device)
            .await?
            .filter(|url| is_local_target(url))
            .unwrap_or_else(|| DASHBOARD_PAGE.to_string()))
    }

    /// Signs in with email and password.
    pub async fn sign_in(&self, device: &Device, form: SignInForm) -> Result<SignedIn> {
        tracing::info!("🔐 Sign-in attempt on device {}", device);
        form.check()?;
        simulate_latency(self.latency.sign_in).await;

        let account = self
            .credentials
            .find_by_credentials(&form.email, &form.password)
            .await?;

        let mut user = account.into_profile();
        user.last_login = Some(self.sessions.clock().now());

        let session = self.sessions.create_session(device, user, form.remember).await?;
        let redirect_to = self.next_page(device).await?;

        tracing::info!("✅ User signed in: {}", session.user.id);
        Ok(SignedIn {
            message: "Sign in successful! Welcome back!",
            session,
            redirect_to,
        })
    }

    /// Registers a new account and signs it in.
    pub async fn sign_up(&self, device: &Device, form: SignUpForm) -> Result<SignedIn> {
        tracing::info!("📝 Sign-up attempt on device {}", device);
        form.check()?;
        let role = form.role()?;
        simulate_latency(self.latency.sign_up).await;

        let now = self.sessions.clock().now();
        let firstname = form.firstname.trim().to_string();
        let lastname = form.lastname.trim().to_string();

        let account = Account {
            profile: Profile {
                id: format!("user-{}", now.timestamp_millis()),
                email: form.email.trim().to_string(),
                name: format!("{} {}", firstname, lastname),
                firstname: Some(firstname),
                lastname: Some(lastname),
                role: Some(role),
                created_at: now,
                last_login: None,
                picture: None,
                verified: None,
                locale: None,
                provider: None,
                oauth_id: None,
            },
            password: Some(form.password),
        };

        let account = self.credentials.register(account).await?;
        let session = self
            .sessions
            .create_session(device, account.into_profile(), false)
            .await?;
        let redirect_to = self.next_page(device).await?;

        Ok(SignedIn {
            message: "Account created successfully! Welcome to CureXpert!",
            session,
            redirect_to,
        })
    }

    /// Signs in through the external identity provider.
    pub async fn google_sign_in(&self, device: &Device) -> Result<SignedIn> {
        tracing::info!("🔐 {} sign-in on device {}", self.identity.name(), device);
        let now = self.sessions.clock().now();
        let incoming = self.identity.authenticate(now).await?;

        let user = self.credentials.merge_external(incoming, now).await?;
        let session = self.sessions.create_session(device, user, false).await?;
        let redirect_to = self.next_page(device).await?;

        Ok(SignedIn {
            message: "Google sign in successful! Welcome!",
            session,
            redirect_to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::SessionTtl;
    use crate::error::AppError;
    use crate::models::account::Role;
    use crate::repositories::session::SessionRepository;
    use crate::services::identity::GoogleStub;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn service() -> (AuthService, CredentialStore, SessionManager) {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        let credentials = CredentialStore::new(store.clone());
        let sessions = SessionManager::new(
            SessionRepository::new(store),
            Arc::new(clock),
            SessionTtl::default(),
        );
        let auth = AuthService::new(
            credentials.clone(),
            sessions.clone(),
            Arc::new(GoogleStub::new(Duration::ZERO)),
            SimulatedLatency::none(),
        );
        (auth, credentials, sessions)
    }

    fn sign_up_form(email: &str) -> SignUpForm {
        SignUpForm {
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: email.to_string(),
            password: "analytical".to_string(),
            confirm_password: "analytical".to_string(),
            role: "provider".to_string(),
            terms: true,
        }
    }

    fn sign_in_form(email: &str, password: &str, remember: bool) -> SignInForm {
        SignInForm {
            email: email.to_string(),
            password: password.to_string(),
            remember,
        }
    }

    #[tokio::test]
    async fn sign_up_registers_and_signs_in() {
        let (auth, credentials, sessions) = service();
        let device = Device::new();

        let signed_in = auth.sign_up(&device, sign_up_form("ada@example.com")).await.unwrap();
        assert_eq!(signed_in.redirect_to, DASHBOARD_PAGE);
        assert_eq!(signed_in.session.user.name, "Ada Lovelace");
        assert_eq!(signed_in.session.user.role, Some(Role::Provider));

        let stored = credentials.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(stored.password.as_deref(), Some("analytical"));
        assert_eq!(stored.profile.id, "user-1740830400000");

        let current = sessions.read_session(&device).await.unwrap().unwrap();
        assert_eq!(current.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn sign_up_twice_is_a_duplicate() {
        let (auth, credentials, _) = service();
        auth.sign_up(&Device::new(), sign_up_form("ada@example.com")).await.unwrap();

        let err = auth
            .sign_up(&Device::new(), sign_up_form("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
        assert_eq!(credentials.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_sign_up_writes_nothing() {
        let (auth, credentials, _) = service();
        let mut form = sign_up_form("ada@example.com");
        form.terms = false;

        let err = auth.sign_up(&Device::new(), form).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(credentials.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sign_in_consumes_pending_redirect() {
        let (auth, _, sessions) = service();
        auth.sign_up(&Device::new(), sign_up_form("ada@example.com")).await.unwrap();

        let device = Device::new();
        sessions.remember_redirect(&device, "/solutions.html").await.unwrap();

        let signed_in = auth
            .sign_in(&device, sign_in_form("ada@example.com", "analytical", true))
            .await
            .unwrap();
        assert_eq!(signed_in.redirect_to, "/solutions.html");
        assert!(signed_in.session.user.last_login.is_some());
        assert_eq!(
            signed_in.session.expires - signed_in.session.timestamp,
            chrono::Duration::days(30)
        );
        assert!(sessions.take_redirect(&device).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn off_site_redirect_falls_back_to_dashboard() {
        let (auth, _, sessions) = service();
        let device = Device::new();
        sessions.remember_redirect(&device, "//evil.example/x.html").await.unwrap();

        let signed_in = auth.sign_up(&device, sign_up_form("ada@example.com")).await.unwrap();
        assert_eq!(signed_in.redirect_to, DASHBOARD_PAGE);
        assert!(sessions.take_redirect(&device).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn wrong_password_creates_no_session() {
        let (auth, _, sessions) = service();
        auth.sign_up(&Device::new(), sign_up_form("ada@example.com")).await.unwrap();

        let device = Device::new();
        let err = auth
            .sign_in(&device, sign_in_form("ada@example.com", "wrong", false))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert!(sessions.read_session(&device).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn google_sign_in_twice_keeps_one_account() {
        let (auth, credentials, _) = service();
        let device = Device::new();

        let first = auth.google_sign_in(&device).await.unwrap();
        let second = auth.google_sign_in(&device).await.unwrap();

        assert_eq!(first.session.user.email, GoogleStub::EMAIL);
        assert_eq!(first.session.user.role, None);
        assert_eq!(second.session.user.id, first.session.user.id);
        assert_eq!(credentials.list().await.unwrap().len(), 1);
    }
}
