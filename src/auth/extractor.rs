// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer header parsing and the `Auth` extractor.
//!
//! Handlers behind [`require_permission`](super::middleware::require_permission)
//! receive the claims the gate already verified:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims.permissions holds the granted permission strings
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, Claims};
use crate::state::AppState;

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. The header must consist of
/// exactly the scheme and a non-empty token separated by whitespace.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    if value.trim().is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }

    let token = parts.next().ok_or(AuthError::MalformedHeader)?;
    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

/// Extractor for verified token claims.
///
/// Uses the claims placed in the request extensions by the permission gate.
/// On an ungated route it verifies the bearer token itself, without any
/// permission requirement.
pub struct Auth(pub Claims);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the claims
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(Auth(claims));
        }

        let token = bearer_token(&parts.headers)?;
        let claims = state.verifier.verify(token).await?;

        Ok(Auth(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{claims, sign, test_state};
    use axum::http::{HeaderValue, Request};

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_extracts_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers_with("bearer tok")).unwrap(), "tok");
        assert_eq!(bearer_token(&headers_with("BEARER tok")).unwrap(), "tok");
    }

    #[test]
    fn missing_header_is_rejected() {
        let empty = HeaderMap::new();
        let result = bearer_token(&empty);
        assert!(matches!(result, Err(AuthError::MissingHeader)));

        let blank = headers_with("");
        let result = bearer_token(&blank);
        assert!(matches!(result, Err(AuthError::MissingHeader)));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for value in ["Bearer ", "Bearer", "Basic abc", "Bearer a b", "Token abc"] {
            let headers = headers_with(value);
            let result = bearer_token(&headers);
            assert!(
                matches!(result, Err(AuthError::MalformedHeader)),
                "{value:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn non_ascii_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer caf\xc3\xa9").unwrap(),
        );
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_verifies_token() {
        let (state, _temp_dir) = test_state();
        let token = sign(&claims(&["post:drinks"]));
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let Auth(claims) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(claims.has_permission("post:drinks"));
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _temp_dir) = test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let mut from_gate: Claims = serde_json::from_value(claims(&[])).unwrap();
        from_gate.sub = Some("auth0|from-gate".to_string());
        parts.extensions.insert(from_gate);

        let Auth(claims) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(claims.subject(), "auth0|from-gate");
    }
}
