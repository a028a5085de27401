// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-route permission gate for Axum.
//!
//! The gate is registered on individual method routers with `route_layer`,
//! so public routes on the same path stay open:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/drinks", get(list_drinks))
//!     .route(
//!         "/drinks",
//!         post(create_drink).route_layer(axum::middleware::from_fn_with_state(
//!             state.gate(Permission::PostDrinks),
//!             require_permission,
//!         )),
//!     );
//! ```
//!
//! On success the verified [`Claims`] are inserted into the request
//! extensions, where the [`Auth`](super::Auth) extractor picks them up.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::bearer_token;
use super::permissions::Permission;
use super::verifier::TokenVerifier;
use super::{AuthError, Claims};

/// A verifier paired with the permission one route requires.
#[derive(Clone)]
pub struct PermissionGate {
    verifier: Arc<TokenVerifier>,
    permission: String,
}

impl PermissionGate {
    /// Gate requiring `permission`.
    pub fn new(verifier: Arc<TokenVerifier>, permission: Permission) -> Self {
        Self {
            verifier,
            permission: permission.as_str().to_string(),
        }
    }

    /// Gate requiring only a verified token.
    pub fn authenticated(verifier: Arc<TokenVerifier>) -> Self {
        Self {
            verifier,
            permission: String::new(),
        }
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// Run the header, verification and permission steps in order.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        tracing::debug!("Getting token from header");
        let token = bearer_token(headers).inspect_err(|e| {
            tracing::info!(error_code = e.error_code(), "Authorization token not found in header");
        })?;

        tracing::debug!("Verifying token");
        let claims = self.verifier.verify(token).await.inspect_err(|e| {
            tracing::info!(error_code = e.error_code(), "Token verification failed");
        })?;

        tracing::debug!(permission = %self.permission, "Checking permissions");
        claims.require_permission(&self.permission).inspect_err(|e| {
            tracing::info!(
                error_code = e.error_code(),
                subject = claims.subject(),
                permission = %self.permission,
                "Required permission not present"
            );
        })?;

        tracing::debug!(subject = claims.subject(), "Permission check successful");
        Ok(claims)
    }
}

/// Authentication middleware function.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.authorize(request.headers()).await {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
