//! Refresh and validation handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::post;

use crate::extract::{Json, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{RefreshTokenRequest, ValidateTokenRequest};
use crate::handler::response::{AccessTokenResponse, ValidateTokenResponse};
use crate::service::{CredentialService, ServiceState};

/// Tracing target for token handlers.
const TRACING_TARGET: &str = "syncauth_server::handler::tokens";

/// Exchanges a refresh token for a new access token.
///
/// The refresh token is not rotated.
#[tracing::instrument(skip_all, target = TRACING_TARGET)]
async fn refresh(
    State(credentials): State<CredentialService>,
    ValidateJson(request): ValidateJson<RefreshTokenRequest>,
) -> Result<Json<AccessTokenResponse>> {
    let access_token = credentials
        .refresh(&request.refresh_token, &request.fingerprint)
        .await?;
    Ok(Json(AccessTokenResponse { access_token }))
}

#[tracing::instrument(skip_all, target = TRACING_TARGET)]
async fn validate(
    State(credentials): State<CredentialService>,
    ValidateJson(request): ValidateJson<ValidateTokenRequest>,
) -> Result<Json<ValidateTokenResponse>> {
    let user_id = credentials.validate(&request.access_token)?;
    Ok(Json(ValidateTokenResponse { user_id }))
}

/// Returns the token routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/auth/token/refresh", post(refresh))
        .route("/auth/token/validate", post(validate))
}
