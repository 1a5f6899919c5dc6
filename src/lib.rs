use std::time::Duration;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use http::{header, HeaderValue, Method};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod clock;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;

pub mod models {
    pub mod account;
    pub mod activity;
    pub mod session;
}

pub mod repositories {
    pub mod account;
    pub mod session;
}

pub mod services {
    pub mod auth;
    pub mod dashboard;
    pub mod guard;
    pub mod identity;
    pub mod session;
}

pub mod handlers {
    pub mod auth;
    pub mod dashboard;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod device;
}

pub mod validation {
    pub mod auth;
}

use state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/signin", post(handlers::auth::sign_in))
        .route("/api/auth/signup", post(handlers::auth::sign_up))
        .route("/api/auth/google", post(handlers::auth::google_sign_in))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/password-strength", post(handlers::auth::strength))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/auth/session", get(handlers::auth::current_session))
        .route("/api/auth/view", get(handlers::auth::page_view))
        .route("/api/dashboard", get(handlers::dashboard::dashboard))
        .route("/api/dashboard/health", get(handlers::dashboard::health))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_session,
        ))
        .with_state(state.clone());

    let pages = Router::new()
        .fallback_service(ServeDir::new(&state.config.public_dir))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::guard_page,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback_service(pages)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::default())
                        .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                        .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
                )
                .layer(cors_layer(&state.config.cors_origins))
                .layer(CookieManagerLayer::new())
                .layer(from_fn_with_state(
                    state.clone(),
                    middleware_layer::device::assign_device,
                )),
        )
}
