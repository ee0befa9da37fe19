//! Sign-up, login, logout and OAuth handlers.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;

use crate::extract::{Json, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{CredentialsRequest, LogoutRequest, OAuthRequest};
use crate::handler::response::TokenPairResponse;
use crate::service::{CredentialService, ServiceState};

/// Tracing target for authentication handlers.
const TRACING_TARGET: &str = "syncauth_server::handler::authentication";

/// Creates an account and signs it in on the calling device.
#[tracing::instrument(skip_all, target = TRACING_TARGET)]
async fn signup(
    State(credentials): State<CredentialService>,
    ValidateJson(request): ValidateJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<TokenPairResponse>)> {
    let user_id = credentials.signup(&request.email, &request.password).await?;
    let pair = credentials
        .issue_tokens(user_id, &request.fingerprint)
        .await?;

    tracing::debug!(target: TRACING_TARGET, %user_id, "Signed up");
    Ok((StatusCode::CREATED, Json(pair.into())))
}

#[tracing::instrument(skip_all, target = TRACING_TARGET)]
async fn login(
    State(credentials): State<CredentialService>,
    ValidateJson(request): ValidateJson<CredentialsRequest>,
) -> Result<Json<TokenPairResponse>> {
    let pair = credentials
        .login(&request.email, &request.password, &request.fingerprint)
        .await?;
    Ok(Json(pair.into()))
}

/// Revokes the refresh token of the calling device.
#[tracing::instrument(skip_all, target = TRACING_TARGET)]
async fn logout(
    State(credentials): State<CredentialService>,
    ValidateJson(request): ValidateJson<LogoutRequest>,
) -> Result<StatusCode> {
    credentials
        .logout(&request.access_token, &request.fingerprint)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(credentials, request), target = TRACING_TARGET)]
async fn oauth(
    State(credentials): State<CredentialService>,
    Path(provider): Path<String>,
    ValidateJson(request): ValidateJson<OAuthRequest>,
) -> Result<Json<TokenPairResponse>> {
    let pair = credentials
        .oauth_login(&provider, &request.code, &request.fingerprint)
        .await?;
    Ok(Json(pair.into()))
}

/// Returns the authentication routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/oauth/{provider}", post(oauth))
}
