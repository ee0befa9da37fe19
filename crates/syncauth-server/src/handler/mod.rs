//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod error;
mod monitors;
pub mod request;
pub mod response;
mod tokens;
mod verification;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::ErrorResponse;
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with every route, a JSON 404 fallback and `state` applied.
pub fn routes(state: ServiceState) -> Router {
    Router::new()
        .merge(authentication::routes())
        .merge(tokens::routes())
        .merge(verification::routes())
        .merge(monitors::routes())
        .fallback(handler)
        .with_state(state)
}
