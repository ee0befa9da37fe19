//! Bearer token extraction from the `Authorization` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;

use crate::handler::{Error, ErrorKind};

/// Raw access token taken from `Authorization: Bearer <token>`.
///
/// The token is not validated here; services validate it as part of the
/// operation. The extracted value is cached in the request extensions.
#[must_use]
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    /// Returns the token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the extractor and returns the token.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BearerToken").field(&"****").finish()
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Sync + Send,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(token) = parts.extensions.get::<Self>() {
            return Ok(token.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        match AuthBearerHeader::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer))) => {
                let token = Self(bearer.token().to_owned());
                parts.extensions.insert(token.clone());
                Ok(token)
            }
            Err(rejection) => {
                let error = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                        .with_message("Authentication required")
                        .with_context("Missing Authorization header with Bearer token")
                        .with_resource("authentication"),
                    TypedHeaderRejectionReason::Error(_) => ErrorKind::MalformedAuthToken
                        .with_message("Invalid token format")
                        .with_context("Authorization header must contain a valid Bearer token")
                        .with_resource("authentication"),
                    _ => ErrorKind::InternalServerError
                        .with_context("Unexpected error during header extraction")
                        .with_resource("authentication"),
                };
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Request, header};

    use super::*;

    async fn extract(value: Option<&str>) -> Result<BearerToken, Error<'static>> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).map_err(|_| Error::default())?.into_parts();
        BearerToken::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn extracts_token() -> anyhow::Result<()> {
        let token = extract(Some("Bearer abc.def.ghi")).await?;
        assert_eq!(token.as_str(), "abc.def.ghi");
        assert!(!format!("{token:?}").contains("abc"));
        Ok(())
    }

    #[tokio::test]
    async fn rejections() {
        let error = extract(None).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingAuthToken);

        let error = extract(Some("Basic dXNlcjpwYXNz")).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);
    }
}
