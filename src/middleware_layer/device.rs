use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::{time::Duration, SameSite};
use uuid::Uuid;

use crate::{models::session::Device, state::AppState};

/// The cookie naming the visitor's device.
pub const DEVICE_COOKIE: &str = "device_id";
/// The device cookie outlives the longest session.
const DEVICE_COOKIE_DAYS: i64 = 365;

fn device_cookie(device: &Device, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(DEVICE_COOKIE, device.to_string());
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::days(DEVICE_COOKIE_DAYS));
    cookie.set_path("/");
    cookie
}

/// Attaches a [`Device`] to every request, issuing a new device cookie to
/// browsers that have none.
pub async fn assign_device(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let existing = cookies
        .get(DEVICE_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
        .map(Device);

    let device = match existing {
        Some(device) => device,
        None => {
            let device = Device::new();
            tracing::debug!("🆕 New device: {}", device);
            cookies.add(device_cookie(&device, state.config.secure_cookies));
            device
        }
    };

    request.extensions_mut().insert(device);
    next.run(request).await
}
