//! Email verification handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::post;

use crate::extract::{BearerToken, Json};
use crate::handler::Result;
use crate::handler::request::ConfirmCodeRequest;
use crate::handler::response::{ConfirmCodeResponse, VerifyEmailResponse};
use crate::service::{CredentialService, ServiceState};

/// Tracing target for verification handlers.
const TRACING_TARGET: &str = "syncauth_server::handler::verification";

/// Emails a fresh verification code to the bearer.
#[tracing::instrument(skip_all, target = TRACING_TARGET)]
async fn verify_email(
    State(credentials): State<CredentialService>,
    bearer: BearerToken,
) -> Result<Json<VerifyEmailResponse>> {
    let code_ttl = credentials.verify_email(bearer.as_str()).await?;
    Ok(Json(VerifyEmailResponse::sent(code_ttl)))
}

/// Confirms a verification code.
///
/// Expired and incorrect codes answer `200` with `success: false`.
#[tracing::instrument(skip_all, target = TRACING_TARGET)]
async fn confirm_code(
    State(credentials): State<CredentialService>,
    bearer: BearerToken,
    Json(request): Json<ConfirmCodeRequest>,
) -> Result<Json<ConfirmCodeResponse>> {
    let outcome = credentials
        .confirm_code(bearer.as_str(), request.code)
        .await?;
    Ok(Json(outcome.into()))
}

/// Returns the email verification routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/auth/email/verify", post(verify_email))
        .route("/auth/email/confirm", post(confirm_code))
}
