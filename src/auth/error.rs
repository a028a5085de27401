// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Failure raised while authenticating or authorizing a request.
///
/// Every header and verification failure maps to `401`, every permission
/// failure to `403`. The variant is kept for logging through
/// [`AuthError::error_code`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingHeader,
    /// Header is not exactly `Bearer <token>`
    #[error("Authorization header must be of the form 'Bearer <token>'")]
    MalformedHeader,
    /// Token header or payload cannot be parsed, or the signature is bad
    #[error("Unable to parse authentication token")]
    MalformedToken,
    /// No key in the JWKS matches the token's key id
    #[error("Token was not signed by a known key")]
    UnknownSigningKey,
    /// Token has expired
    #[error("Token has expired")]
    ExpiredToken,
    /// Issuer, audience or time-based claims do not match
    #[error("Incorrect claims, please check the audience and issuer")]
    InvalidClaims,
    /// JWKS could not be fetched or decoded
    #[error("Signing keys are unavailable")]
    JwksUnavailable(String),
    /// Verified claims carry no `permissions` field
    #[error("Token does not carry any permissions")]
    MissingPermissions,
    /// Verified claims lack the required permission
    #[error("You are not allowed to make this request")]
    PermissionDenied,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing_header",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::UnknownSigningKey => "unknown_signing_key",
            AuthError::ExpiredToken => "expired_token",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::JwksUnavailable(_) => "jwks_unavailable",
            AuthError::MissingPermissions => "missing_permissions",
            AuthError::PermissionDenied => "permission_denied",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingPermissions | AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            AuthError::MissingHeader
            | AuthError::MalformedHeader
            | AuthError::MalformedToken
            | AuthError::UnknownSigningKey
            | AuthError::ExpiredToken
            | AuthError::InvalidClaims
            | AuthError::JwksUnavailable(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::new(self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_header_returns_401_envelope() {
        let response = AuthError::MissingHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 401);
        assert_eq!(body["message"], "Authorization header is required");
    }

    #[tokio::test]
    async fn permission_errors_return_403() {
        let response = AuthError::PermissionDenied.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = AuthError::MissingPermissions.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn jwks_detail_is_not_exposed() {
        let err = AuthError::JwksUnavailable("connection refused to 10.0.0.1".into());
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.error_code(), "jwks_unavailable");

        let body_bytes = to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert!(!body.contains("10.0.0.1"));
    }
}
