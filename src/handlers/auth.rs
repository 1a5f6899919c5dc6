use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    models::{
        account::Profile,
        session::{AuthContext, Device, Session},
    },
    services::{
        auth::SignedIn,
        guard::PageView,
    },
    state::AppState,
    validation::auth::{password_strength, PasswordStrength, SignInForm, SignUpForm},
};

/// The response payload for sign-in, sign-up and Google sign-in.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: Profile,
    pub redirect_to: String,
}

impl From<SignedIn> for AuthResponse {
    fn from(signed_in: SignedIn) -> Self {
        Self {
            success: true,
            message: signed_in.message.to_string(),
            user: signed_in.session.user,
            redirect_to: signed_in.redirect_to,
        }
    }
}

/// The response payload for logout.
#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
    pub redirect_to: String,
}

/// The request payload for the password strength meter.
#[derive(Deserialize, Debug)]
pub struct StrengthRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct StrengthResponse {
    pub strength: PasswordStrength,
    pub score: u8,
}

#[derive(Deserialize, Debug)]
pub struct ViewQuery {
    pub page: Option<String>,
}

/// Handles email and password sign-in.
#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Json(form): Json<SignInForm>,
) -> Result<Response> {
    let signed_in = state.auth.sign_in(&device, form).await?;
    Ok((StatusCode::OK, Json(AuthResponse::from(signed_in))).into_response())
}

/// Handles account registration.
#[axum::debug_handler]
pub async fn sign_up(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Json(form): Json<SignUpForm>,
) -> Result<Response> {
    let signed_in = state.auth.sign_up(&device, form).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(signed_in))).into_response())
}

/// Handles the Google sign-in button.
#[axum::debug_handler]
pub async fn google_sign_in(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
) -> Result<Response> {
    let signed_in = state.auth.google_sign_in(&device).await?;
    Ok((StatusCode::OK, Json(AuthResponse::from(signed_in))).into_response())
}

/// Handles logout. Works with or without a live session.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
) -> Result<Response> {
    let redirect_to = state.guard.logout(&device).await?;

    let response = LogoutResponse {
        success: true,
        message: "Logout successful".to_string(),
        redirect_to: redirect_to.to_string(),
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Rates a password for the sign-up strength bar.
pub async fn strength(Json(payload): Json<StrengthRequest>) -> Json<StrengthResponse> {
    let (strength, score) = password_strength(&payload.password);
    Json(StrengthResponse { strength, score })
}

/// Returns the current session.
pub async fn current_session(Extension(context): Extension<AuthContext>) -> Json<Session> {
    Json(context.session)
}

/// Returns how a page should render for the signed-in visitor.
pub async fn page_view(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Query(query): Query<ViewQuery>,
) -> Json<PageView> {
    let page = query.page.unwrap_or_default();
    Json(state.guard.page_view(&context, &page))
}
