//! Authorization endpoint

use bytes::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info_span, warn};

use super::middleware::{authenticate, log_request, request_id, set_request_id};
use crate::api::AuthzApi;
use crate::error::{ErrorKind, IamError};

/// Path of the authorization endpoint
pub const AUTHORIZE_PATH: &str = "/api/v1/authorize";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorizeResourcesRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorizeResourcesResponse {
    pub resources_allowed: Vec<String>,
}

/// Error body returned with every non-2xx status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(code: &str, message: impl Into<String>) -> Self {
        ErrorResponse {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Routes requests to the authorization API
///
/// Request handling is synchronous; the server collects the body first.
#[derive(Clone)]
pub struct WorkerHandler {
    authz: AuthzApi,
}

impl WorkerHandler {
    pub fn new(authz: AuthzApi) -> Self {
        WorkerHandler { authz }
    }

    /// Run a request through the middleware chain and the router
    pub fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let request_id = request_id(&request);
        let span = info_span!("request", request_id = %request_id);
        let _guard = span.enter();

        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let user_id = authenticate(&request);

        let mut response = match &user_id {
            Some(user_id) => self.route(user_id, request),
            None => error_response(
                StatusCode::UNAUTHORIZED,
                &ErrorResponse::new(
                    "AuthenticationApiError",
                    format!("Missing {} header", super::USER_ID_HEADER),
                ),
            ),
        };

        set_request_id(&mut response, &request_id);
        log_request(
            &method,
            &path,
            response.status(),
            &request_id,
            user_id.as_deref(),
        );
        response
    }

    fn route(&self, user_id: &str, request: Request<Bytes>) -> Response<Bytes> {
        match (request.method(), request.uri().path()) {
            (&Method::POST, AUTHORIZE_PATH) => self.authorize_resources(user_id, request.body()),
            (_, AUTHORIZE_PATH) => error_response(
                StatusCode::METHOD_NOT_ALLOWED,
                &ErrorResponse::new(
                    "MethodNotAllowedError",
                    format!("Method {} not allowed", request.method()),
                ),
            ),
            (_, path) => error_response(
                StatusCode::NOT_FOUND,
                &ErrorResponse::new("NotFoundError", format!("No route for {}", path)),
            ),
        }
    }

    fn authorize_resources(&self, user_id: &str, body: &Bytes) -> Response<Bytes> {
        let request: AuthorizeResourcesRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed authorize request: {}", e);
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &ErrorResponse::new("InvalidParameterError", e.to_string()),
                );
            }
        };

        debug!("Action {}, Resources {:?}", request.action, request.resources);

        match self.authz.get_authorized_external_resources(
            user_id,
            &request.action,
            &request.resources,
        ) {
            Ok(resources_allowed) => json_response(
                StatusCode::OK,
                &AuthorizeResourcesResponse { resources_allowed },
            ),
            Err(e) => api_error_response(&e),
        }
    }
}

fn api_error_response(err: &IamError) -> Response<Bytes> {
    let status = match err.kind() {
        ErrorKind::InvalidParameter | ErrorKind::PatternSyntax => StatusCode::BAD_REQUEST,
        // An unknown principal is a refusal, not a server fault
        ErrorKind::Unauthorized | ErrorKind::NotFound => StatusCode::FORBIDDEN,
        ErrorKind::AlreadyExists | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Authorization failed: {}", err);
        return error_response(
            status,
            &ErrorResponse::new("UnknownApiError", "Internal server error"),
        );
    }

    warn!("Authorization rejected: {}", err);
    error_response(status, &ErrorResponse::new(err.code(), err.to_string()))
}

fn error_response(status: StatusCode, body: &ErrorResponse) -> Response<Bytes> {
    json_response(status, body)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Bytes> {
    let (status, payload) = match serde_json::to_vec(body) {
        Ok(payload) => (status, Bytes::from(payload)),
        Err(e) => {
            error!("Failed to encode response body: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Bytes::new())
        }
    };

    let mut response = Response::new(payload);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
