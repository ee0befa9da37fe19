//! Liveness check.

use axum::Router;
use axum::routing::get;
use serde::{Deserialize, Serialize};

use crate::extract::Json;
use crate::service::ServiceState;

/// Liveness response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

/// Returns the monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::HealthResponse;
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn health_is_ok() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<HealthResponse>().status, "ok");
        Ok(())
    }
}
