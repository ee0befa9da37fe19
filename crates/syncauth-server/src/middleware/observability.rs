//! Request tracing.

use axum::Router;
use axum::http::header;
use tower::ServiceBuilder;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

/// Extension trait for `axum::`[`Router`] to apply request tracing.
pub trait RouterObservabilityExt<S> {
    /// Layers an HTTP trace span around every request.
    ///
    /// The `Authorization` header is marked sensitive first so it never
    /// shows up in logged requests.
    fn with_observability(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        let middlewares = ServiceBuilder::new()
            .layer(SetSensitiveRequestHeadersLayer::new([header::AUTHORIZATION]))
            .layer(TraceLayer::new_for_http());

        self.layer(middlewares)
    }
}
