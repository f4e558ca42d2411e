//! Request id, authentication and request logging

use bytes::Bytes;
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, StatusCode};
use tracing::info;
use uuid::Uuid;

/// Header carrying the request id, echoed on every response
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";
/// Header carrying the external id of the authenticated caller
pub const USER_ID_HEADER: &str = "X-Authorizr-User-Id";

/// Reuse the caller's request id, or generate one
pub(crate) fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// External id of the caller, if the request carries one
pub(crate) fn authenticate<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub(crate) fn set_request_id(response: &mut Response<Bytes>, request_id: &str) {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
}

pub(crate) fn log_request(
    method: &Method,
    path: &str,
    status: StatusCode,
    request_id: &str,
    user_id: Option<&str>,
) {
    info!(
        request_id = %request_id,
        user_id = user_id.unwrap_or("-"),
        "{} {} {}",
        method,
        path,
        status.as_u16()
    );
}
