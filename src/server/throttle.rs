//! Rate-limit middleware and client identification.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{Extensions, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use super::{ApiError, AppState};

/// Header carrying the user id, honoured only behind a trusted proxy.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Response header exposing the short-window requests left.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Identity attached to the request by the authentication middleware.
///
/// Clients cannot set request extensions, so this is the only identity the
/// limiter trusts unconditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Derives the rate-limit key for a request.
///
/// An [`AuthenticatedUser`] extension wins. `x-user-id` and the first
/// `x-forwarded-for` address are consulted only when `trust_proxy_headers`
/// is set. Otherwise the socket peer address is used.
#[must_use]
pub fn client_key(
    extensions: &Extensions,
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    if let Some(AuthenticatedUser(user)) = extensions.get::<AuthenticatedUser>()
        && !user.trim().is_empty()
    {
        return format!("user:{}", user.trim());
    }

    if trust_proxy_headers {
        if let Some(user) = header_str(headers, USER_ID_HEADER) {
            return format!("user:{user}");
        }

        if let Some(forwarded) = header_str(headers, FORWARDED_FOR_HEADER)
            .and_then(|value| value.split(',').map(str::trim).find(|addr| !addr.is_empty()))
        {
            return format!("ip:{forwarded}");
        }
    }

    match peer {
        Some(addr) => format!("ip:{}", addr.ip()),
        None => "ip:unknown".to_string(),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Checks both quotas before the request reaches a handler.
pub(crate) async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(
        request.extensions(),
        request.headers(),
        peer,
        state.trust_proxy_headers,
    );

    let decision = state.limiter.check_request(&key)?;

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
    Ok(response)
}
