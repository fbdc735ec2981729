//! User token extraction.
//!
//! Every image operation is scoped to an opaque token sent verbatim in the
//! `Authorization` header:
//!
//! ```text
//! GET /receipts/receipt.jpg
//! Authorization: abc
//! ```
//!
//! The token is not verified against anything. Its presence is the only
//! check; its shape is checked later by the store locator.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Authentication error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one
    MissingToken,

    /// Header value is not visible ASCII
    InvalidHeader,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Unauthorized"),
            AuthError::InvalidHeader => write!(f, "Unauthorized: invalid Authorization header"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        debug!(
            error_type = "unauthorized",
            status = StatusCode::UNAUTHORIZED.as_u16(),
            "Authentication failed: {}",
            self
        );

        (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
    }
}

/// The user token of the current request.
///
/// Rejects the request with `401 Unauthorized` before the handler runs (and
/// before any request body is read) when the token is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserToken(pub String);

impl UserToken {
    /// Read the token from request headers.
    pub fn from_parts(parts: &Parts) -> Result<Self, AuthError> {
        let value = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?;
        let token = value.to_str().map_err(|_| AuthError::InvalidHeader)?;

        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        Ok(UserToken(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for UserToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        UserToken::from_parts(parts)
    }
}

// =============================================================================
// Tests
// =============================================================================
