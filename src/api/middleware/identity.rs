use crate::AppState;
use crate::config::IdentitySource;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use uuid::Uuid;

/// Lookup key for "my numbers". Derived from the client IP or a session
/// cookie; it is never checked against anything and grants no access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

impl CallerIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match state.config.identity_source {
        IdentitySource::ClientIp => {
            let ip = client_ip(&req);
            req.extensions_mut().insert(CallerIdentity(ip));
            next.run(req).await
        }
        IdentitySource::Cookie => {
            let cookie_name = &state.config.session_cookie_name;
            let existing = read_cookie(req.headers(), cookie_name);
            let issued = existing.is_none();
            let session_id = existing.unwrap_or_else(|| Uuid::new_v4().to_string());

            req.extensions_mut()
                .insert(CallerIdentity(session_id.clone()));
            let mut response = next.run(req).await;

            if issued {
                let cookie = format!(
                    "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
                    cookie_name, session_id, state.config.session_max_age_secs
                );
                match HeaderValue::from_str(&cookie) {
                    Ok(value) => {
                        response.headers_mut().append(header::SET_COOKIE, value);
                    }
                    Err(e) => tracing::warn!("Could not encode session cookie: {}", e),
                }
            }

            response
        }
    }
}

/// Client address: forwarding headers first, then the socket peer.
pub fn client_ip(req: &Request) -> String {
    let headers = req.headers();

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
