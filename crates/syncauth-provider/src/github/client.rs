//! Reqwest-based GitHub OAuth client.

use std::sync::Arc;

use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

use super::{Error, GitHubConfig, PROVIDER_NAME, Result, TRACING_TARGET};
use crate::{OAuthProvider, OAuthRegistry};

const EMAILS_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Body returned by the token endpoint.
///
/// GitHub answers `200 OK` for rejected codes too, with `error` set instead
/// of `access_token`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_access_token(self) -> Result<String> {
        if let Some(error) = self.error {
            return Err(Error::Exchange {
                error,
                description: self.error_description,
            });
        }

        self.access_token
            .filter(|token| !token.is_empty())
            .ok_or(Error::MissingAccessToken)
    }
}

/// One entry of `GET /user/emails`.
#[derive(Debug, Deserialize)]
struct AccountEmail {
    email: String,
    primary: bool,
    verified: bool,
}

fn primary_verified_email(emails: Vec<AccountEmail>) -> Result<String> {
    emails
        .into_iter()
        .find(|entry| entry.primary && entry.verified)
        .map(|entry| entry.email)
        .ok_or(Error::NoVerifiedEmail)
}

struct GitHubClientInner {
    http: Client,
    client_id: String,
    client_secret: String,
    token_url: Url,
    emails_url: Url,
    config: GitHubConfig,
}

/// GitHub implementation of [`OAuthProvider`].
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<GitHubClientInner>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let client_id = config
            .github_client_id
            .clone()
            .ok_or(Error::NotConfigured("client id"))?;
        let client_secret = config
            .github_client_secret
            .clone()
            .ok_or(Error::NotConfigured("client secret"))?;

        let token_url = Url::parse(&config.github_token_url)?;
        let mut api_url = Url::parse(&config.github_api_url)?;
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }
        let emails_url = api_url.join("user/emails")?;

        let timeout = config.effective_timeout();
        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = timeout.as_millis(),
            token_url = %token_url,
            "Creating GitHub client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent())
            .build()?;

        let inner = GitHubClientInner {
            http,
            client_id,
            client_secret,
            token_url,
            emails_url,
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &GitHubConfig {
        &self.inner.config
    }

    /// Registers this client under `github`.
    pub fn register(self, registry: OAuthRegistry) -> OAuthRegistry {
        registry.with_provider(PROVIDER_NAME, self)
    }

    async fn request_access_token(&self, code: &str) -> Result<String> {
        let inner = &self.inner;
        let mut form = vec![
            ("client_id", inner.client_id.as_str()),
            ("client_secret", inner.client_secret.as_str()),
            ("code", code),
        ];
        if let Some(redirect_url) = inner.config.github_redirect_url.as_deref() {
            form.push(("redirect_uri", redirect_url));
        }

        let response: TokenResponse = inner
            .http
            .post(inner.token_url.clone())
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_access_token()
    }

    async fn request_emails(&self, access_token: &str) -> Result<String> {
        let inner = &self.inner;
        let emails: Vec<AccountEmail> = inner
            .http
            .get(inner.emails_url.clone())
            .bearer_auth(access_token)
            .header(ACCEPT, EMAILS_MEDIA_TYPE)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(
            target: TRACING_TARGET,
            count = emails.len(),
            "Fetched account emails"
        );

        primary_verified_email(emails)
    }
}

#[async_trait::async_trait]
impl OAuthProvider for GitHubClient {
    async fn exchange_code(&self, code: &str) -> syncauth_core::Result<String> {
        self.request_access_token(code).await.map_err(Into::into)
    }

    async fn fetch_verified_email(&self, access_token: &str) -> syncauth_core::Result<String> {
        self.request_emails(access_token).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_response(json: &str) -> anyhow::Result<TokenResponse> {
        Ok(serde_json::from_str(json)?)
    }

    #[test]
    fn token_response_with_token() -> anyhow::Result<()> {
        let response =
            token_response(r#"{"access_token":"gho_abc","token_type":"bearer","scope":""}"#)?;
        assert_eq!(response.into_access_token()?, "gho_abc");
        Ok(())
    }

    #[test]
    fn token_response_with_error() -> anyhow::Result<()> {
        let response = token_response(
            r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
        )?;
        let error = response.into_access_token().unwrap_err();
        assert!(matches!(error, Error::Exchange { ref error, .. } if error == "bad_verification_code"));
        Ok(())
    }

    #[test]
    fn token_response_without_token() -> anyhow::Result<()> {
        let response = token_response(r#"{"access_token":""}"#)?;
        assert!(matches!(
            response.into_access_token(),
            Err(Error::MissingAccessToken)
        ));
        Ok(())
    }

    #[test]
    fn picks_primary_verified_email() -> anyhow::Result<()> {
        let emails: Vec<AccountEmail> = serde_json::from_str(
            r#"[
                {"email":"old@example.com","primary":false,"verified":true,"visibility":null},
                {"email":"main@example.com","primary":true,"verified":true,"visibility":"private"}
            ]"#,
        )?;
        assert_eq!(primary_verified_email(emails)?, "main@example.com");
        Ok(())
    }

    #[test]
    fn unverified_primary_is_rejected() -> anyhow::Result<()> {
        let emails: Vec<AccountEmail> = serde_json::from_str(
            r#"[{"email":"main@example.com","primary":true,"verified":false}]"#,
        )?;
        assert!(matches!(
            primary_verified_email(emails),
            Err(Error::NoVerifiedEmail)
        ));
        assert!(matches!(
            primary_verified_email(Vec::new()),
            Err(Error::NoVerifiedEmail)
        ));
        Ok(())
    }

    #[test]
    fn requires_client_credentials() {
        assert!(matches!(
            GitHubClient::new(GitHubConfig::default()),
            Err(Error::NotConfigured("client id"))
        ));
    }

    #[test]
    fn emails_url_respects_api_prefix() -> anyhow::Result<()> {
        let config = GitHubConfig::new("id", "secret")
            .with_endpoints("http://localhost:9000/token", "http://localhost:9000/api/v3");
        let client = GitHubClient::new(config)?;
        assert_eq!(
            client.inner.emails_url.as_str(),
            "http://localhost:9000/api/v3/user/emails"
        );
        Ok(())
    }
}
