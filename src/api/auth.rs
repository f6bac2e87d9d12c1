//! HTTP bearer security scheme.
//!
//! Only checks that a credential is present. There is no token validation.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use super::error::ApiError;

/// Name of the security scheme in the OpenAPI document.
pub const BEARER_SCHEME: &str = "HTTPBearer";

/// Credential taken from `Authorization: Bearer <token>`.
///
/// Rejects with 401 "Not authenticated" when the header is missing or uses
/// another scheme. A `Bearer` header with nothing after it is let through as
/// an empty token so the handler can decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// The raw token.
    pub fn token(&self) -> &str {
        &self.0
    }

    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (scheme, credentials) = match value.split_once(' ') {
            Some((scheme, rest)) => (scheme, rest.trim()),
            None => (value, ""),
        };

        scheme
            .eq_ignore_ascii_case("bearer")
            .then(|| Self(credentials.to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(BearerToken::parse)
            .ok_or(ApiError::Unauthorized("Not authenticated"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_header() {
        assert_eq!(
            BearerToken::parse("Bearer abc.def"),
            Some(BearerToken("abc.def".to_string()))
        );
        assert_eq!(
            BearerToken::parse("bearer   xyz "),
            Some(BearerToken("xyz".to_string()))
        );
    }

    #[test]
    fn empty_bearer_is_kept_for_handler() {
        assert_eq!(
            BearerToken::parse("Bearer"),
            Some(BearerToken(String::new()))
        );
        assert_eq!(
            BearerToken::parse("Bearer    "),
            Some(BearerToken(String::new()))
        );
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert_eq!(BearerToken::parse("Basic dXNlcjpwYXNz"), None);
        assert_eq!(BearerToken::parse(""), None);
    }
}
