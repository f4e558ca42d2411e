//! HTTP surface
//!
//! A single endpoint, `POST /api/v1/authorize`, answers which of a list of
//! resources the calling user may act on. Requests pass through the
//! request id, authenticator and request logger middleware in that order.

mod authz;
mod middleware;
mod server;

pub use authz::{
    AuthorizeResourcesRequest, AuthorizeResourcesResponse, ErrorResponse, WorkerHandler,
    AUTHORIZE_PATH,
};
pub use middleware::{REQUEST_ID_HEADER, USER_ID_HEADER};
pub use server::{serve, serve_with_shutdown};
