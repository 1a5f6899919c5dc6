//! Per-page access control.
//!
//! Every page visit resolves to either proceeding (with or without an
//! [`AuthContext`]) or a redirect. Assets are never guarded; only `/` and
//! `*.html` count as pages.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::{
    error::{AppError, Result},
    models::{
        account::Role,
        activity::Dashboard,
        session::{AuthContext, Device},
    },
    services::{dashboard::dashboard_for, session::SessionManager},
};

/// The sign-in page.
pub const AUTH_PAGE: &str = "/auth.html";
/// Where signed-in visitors land by default.
pub const DASHBOARD_PAGE: &str = "/dashboard.html";
/// Where a signed-in visitor opening the sign-in page is sent.
pub const HOME_PAGE: &str = "/index.html";

/// The outcome of guarding one page visit.
#[derive(Debug, Clone)]
pub enum GuardDecision {
    Proceed(Option<AuthContext>),
    Redirect(String),
}

/// The values a page fills into its flagged elements.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
    pub firstname: String,
    pub lastname: String,
}

/// How a page should present itself to the signed-in visitor.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub user_info: UserInfo,
    /// Elements flagged auth-only are shown.
    pub auth_only_visible: bool,
    /// Elements flagged guest-only are hidden.
    pub guest_only_visible: bool,
    /// Only elements flagged with this role stay visible.
    pub visible_role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<Dashboard>,
}

pub fn is_page(path: &str) -> bool {
    path.ends_with('/') || path.ends_with(".html")
}

/// The path part of `target`, percent-decoded the way the file server sees it.
pub fn decoded_path(target: &str) -> Cow<'_, str> {
    let path = target.split('?').next().unwrap_or(target);
    percent_decode_str(path).decode_utf8_lossy()
}

/// Whether `target` stays on this site: a single leading `/`, never `//` or `/\`.
pub fn is_local_target(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
}

#[derive(Clone)]
pub struct AccessGuard {
    sessions: SessionManager,
}

impl AccessGuard {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    /// Looks up the device's session as an explicit context.
    pub async fn authenticate(&self, device: &Device) -> Result<Option<AuthContext>> {
        Ok(self
            .sessions
            .read_session(device)
            .await?
            .map(|session| AuthContext {
                device: *device,
                session,
            }))
    }

    /// Decides what happens to a visit of `target` (path plus query).
    pub async fn resolve(&self, device: &Device, target: &str) -> Result<GuardDecision> {
        let path = decoded_path(target);
        if !is_page(&path) {
            return Ok(GuardDecision::Proceed(None));
        }

        let context = self.authenticate(device).await?;

        if path == AUTH_PAGE {
            return Ok(match context {
                Some(_) => {
                    tracing::debug!("Device {} already signed in, leaving sign-in page", device);
                    GuardDecision::Redirect(HOME_PAGE.to_string())
                }
                None => GuardDecision::Proceed(None),
            });
        }

        match context {
            Some(context) => Ok(GuardDecision::Proceed(Some(context))),
            None => {
                tracing::info!("🔒 Unauthenticated visit to {} from device {}", target, device);
                if is_local_target(target) {
                    self.sessions.remember_redirect(device, target).await?;
                } else {
                    tracing::warn!("Not remembering off-site target {}", target);
                }
                Ok(GuardDecision::Redirect(AUTH_PAGE.to_string()))
            }
        }
    }

    /// Fails closed unless the context's role is exactly `role`.
    pub fn require_role(&self, context: &AuthContext, role: Role) -> Result<()> {
        if context.session.role() != Some(role) {
            tracing::warn!(
                "❌ {} needs role {}, has {:?}",
                context.user().id,
                role,
                context.session.role()
            );
            return Err(AppError::AccessDenied);
        }
        Ok(())
    }

    /// Builds the page view for a signed-in visitor on `page`.
    pub fn page_view(&self, context: &AuthContext, page: &str) -> PageView {
        let user = context.user();
        PageView {
            user_info: UserInfo {
                name: user.name.clone(),
                email: user.email.clone(),
                role: user.role,
                firstname: user.first_name(),
                lastname: user.last_name(),
            },
            auth_only_visible: true,
            guest_only_visible: false,
            visible_role: user.role,
            dashboard: (page == DASHBOARD_PAGE).then(|| dashboard_for(user)),
        }
    }

    /// Ends the device's session and names the page to go to.
    pub async fn logout(&self, device: &Device) -> Result<&'static str> {
        self.sessions.destroy_session(device).await?;
        Ok(AUTH_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::SessionTtl;
    use crate::models::account::Profile;
    use crate::repositories::session::SessionRepository;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn setup() -> (SessionManager, AccessGuard) {
        let sessions = SessionManager::new(
            SessionRepository::new(Arc::new(MemoryStore::new())),
            Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())),
            SessionTtl::default(),
        );
        (sessions.clone(), AccessGuard::new(sessions))
    }

    fn profile(role: Option<Role>) -> Profile {
        Profile {
            id: "user-1".to_string(),
            email: "a@x.com".to_string(),
            name: "Ada Lovelace".to_string(),
            firstname: None,
            lastname: None,
            role,
            created_at: Utc::now(),
            last_login: None,
            picture: None,
            verified: None,
            locale: None,
            provider: None,
            oauth_id: None,
        }
    }

    async fn signed_in(sessions: &SessionManager, role: Option<Role>) -> Device {
        let device = Device::new();
        sessions.create_session(&device, profile(role), false).await.unwrap();
        device
    }

    #[tokio::test]
    async fn anonymous_page_visit_redirects_and_remembers_target() {
        let (sessions, guard) = setup();
        let device = Device::new();

        let decision = guard.resolve(&device, "/solutions.html?tab=care").await.unwrap();
        assert!(matches!(decision, GuardDecision::Redirect(ref to) if to == AUTH_PAGE));
        assert_eq!(
            sessions.take_redirect(&device).await.unwrap().as_deref(),
            Some("/solutions.html?tab=care")
        );
    }

    #[tokio::test]
    async fn sign_in_page_never_loops() {
        let (sessions, guard) = setup();
        let device = Device::new();

        for _ in 0..3 {
            let decision = guard.resolve(&device, AUTH_PAGE).await.unwrap();
            assert!(matches!(decision, GuardDecision::Proceed(None)));
        }
        assert!(sessions.take_redirect(&device).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn signed_in_visitor_leaves_sign_in_page() {
        let (sessions, guard) = setup();
        let device = signed_in(&sessions, Some(Role::Patient)).await;

        let decision = guard.resolve(&device, AUTH_PAGE).await.unwrap();
        assert!(matches!(decision, GuardDecision::Redirect(ref to) if to == HOME_PAGE));
    }

    #[tokio::test]
    async fn assets_are_not_guarded() {
        let (sessions, guard) = setup();
        let device = Device::new();

        let decision = guard.resolve(&device, "/styles/main.css").await.unwrap();
        assert!(matches!(decision, GuardDecision::Proceed(None)));
        assert!(sessions.take_redirect(&device).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn encoded_page_path_is_still_guarded() {
        let (sessions, guard) = setup();
        let device = Device::new();

        let decision = guard.resolve(&device, "/dashboard%2Ehtml").await.unwrap();
        assert!(matches!(decision, GuardDecision::Redirect(ref to) if to == AUTH_PAGE));
        assert_eq!(
            sessions.take_redirect(&device).await.unwrap().as_deref(),
            Some("/dashboard%2Ehtml")
        );

        let device = signed_in(&sessions, Some(Role::Patient)).await;
        let decision = guard.resolve(&device, "/auth%2Ehtml").await.unwrap();
        assert!(matches!(decision, GuardDecision::Redirect(ref to) if to == HOME_PAGE));
    }

    #[tokio::test]
    async fn off_site_target_is_not_remembered() {
        let (sessions, guard) = setup();
        let device = Device::new();

        for target in ["//evil.example/x.html", "/\\evil.example/x.html"] {
            let decision = guard.resolve(&device, target).await.unwrap();
            assert!(matches!(decision, GuardDecision::Redirect(ref to) if to == AUTH_PAGE));
            assert!(sessions.take_redirect(&device).await.unwrap().is_none());
        }
    }

    #[test]
    fn local_targets() {
        assert!(is_local_target("/solutions.html?tab=care"));
        assert!(is_local_target("/"));
        assert!(!is_local_target("//evil.example/x.html"));
        assert!(!is_local_target("/\\evil.example"));
        assert!(!is_local_target("https://evil.example/"));
        assert!(!is_local_target(""));
    }

    #[tokio::test]
    async fn signed_in_page_visit_proceeds_with_context() {
        let (sessions, guard) = setup();
        let device = signed_in(&sessions, Some(Role::Provider)).await;

        match guard.resolve(&device, "/").await.unwrap() {
            GuardDecision::Proceed(Some(context)) => {
                assert_eq!(context.device, device);
                assert_eq!(context.user().email, "a@x.com");
            }
            other => panic!("expected to proceed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn role_check_fails_closed() {
        let (sessions, guard) = setup();
        let patient = guard
            .authenticate(&signed_in(&sessions, Some(Role::Patient)).await)
            .await
            .unwrap()
            .unwrap();
        let roleless = guard
            .authenticate(&signed_in(&sessions, None).await)
            .await
            .unwrap()
            .unwrap();

        assert!(guard.require_role(&patient, Role::Patient).is_ok());
        assert!(matches!(
            guard.require_role(&patient, Role::Partner),
            Err(AppError::AccessDenied)
        ));
        assert!(guard.require_role(&roleless, Role::Patient).is_err());
    }

    #[tokio::test]
    async fn page_view_fills_user_slots() {
        let (sessions, guard) = setup();
        let context = guard
            .authenticate(&signed_in(&sessions, Some(Role::Partner)).await)
            .await
            .unwrap()
            .unwrap();

        let view = guard.page_view(&context, "/index.html");
        assert_eq!(view.user_info.firstname, "Ada");
        assert_eq!(view.user_info.lastname, "Lovelace");
        assert_eq!(view.visible_role, Some(Role::Partner));
        assert!(view.auth_only_visible && !view.guest_only_visible);
        assert!(view.dashboard.is_none());

        let view = guard.page_view(&context, DASHBOARD_PAGE);
        assert_eq!(view.dashboard.map(|d| d.activities.len()), Some(3));
    }

    #[tokio::test]
    async fn logout_points_back_to_sign_in() {
        let (sessions, guard) = setup();
        let device = signed_in(&sessions, Some(Role::Patient)).await;

        assert_eq!(guard.logout(&device).await.unwrap(), AUTH_PAGE);
        assert!(guard.authenticate(&device).await.unwrap().is_none());
    }
}
