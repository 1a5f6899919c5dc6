use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::{
    error::AppError,
    models::session::Device,
    services::guard::GuardDecision,
    state::AppState,
};

/// A middleware that requires a valid session for API routes.
///
/// On success the request carries an [`AuthContext`](crate::models::session::AuthContext).
pub async fn require_session(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking session for device {}", device);

    match state.guard.authenticate(&device).await {
        Ok(Some(context)) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Ok(None) => AppError::Unauthenticated.into_response(),
        Err(e) => e.into_response(),
    }
}

/// A middleware that guards static pages, sending visitors without a
/// session to the sign-in page.
pub async fn guard_page(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    match state.guard.resolve(&device, &target).await {
        Ok(GuardDecision::Proceed(context)) => {
            if let Some(context) = context {
                request.extensions_mut().insert(context);
            }
            next.run(request).await
        }
        Ok(GuardDecision::Redirect(to)) => Redirect::to(&to).into_response(),
        Err(e) => e.into_response(),
    }
}
