// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication and per-route permissions for the drinks API.
//!
//! ## Auth Flow
//!
//! 1. The identity provider issues an access token to the caller
//! 2. The caller sends `Authorization: Bearer <JWT>`
//! 3. The permission gate on a route:
//!    - parses the header
//!    - verifies signature, expiry, issuer and audience against the
//!      provider's JWKS
//!    - checks the `permissions` claim for the route's permission
//! 4. Verified claims are handed to the handler through [`Auth`]
//!
//! ## Security
//!
//! - Only asymmetric algorithms are accepted
//! - Tokens must carry a `kid` present in the JWKS
//! - JWKS is cached with a TTL (zero fetches per request)
//! - Clock skew tolerance defaults to 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod permissions;
pub mod verifier;

pub use claims::Claims;
pub use error::AuthError;
pub use extractor::Auth;
pub use jwks::JwksManager;
pub use middleware::{require_permission, PermissionGate};
pub use permissions::Permission;
pub use verifier::{TokenVerifier, VerifierConfig};
