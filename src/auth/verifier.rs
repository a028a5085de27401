// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against the identity provider's JWKS.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::claims::Claims;
use super::error::AuthError;
use super::jwks::JwksManager;

/// Clock skew tolerance (60 seconds).
pub const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Expected token properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Expected `iss`
    pub issuer: String,
    /// Expected `aud`
    pub audience: String,
    /// Signature algorithms a token may use
    pub algorithms: Vec<Algorithm>,
    /// Clock skew tolerance in seconds
    pub leeway: u64,
}

impl VerifierConfig {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            leeway: CLOCK_SKEW_LEEWAY,
        }
    }

    /// Issuer is `https://{domain}/`, matching what the provider stamps.
    pub fn for_domain(domain: &str, audience: impl Into<String>) -> Self {
        Self::new(format!("https://{domain}/"), audience)
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    /// Validation for a token signed with `algorithm`, already checked against
    /// the configured list. jsonwebtoken rejects a list mixing key families.
    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = self.leeway;
        validation
    }
}

/// Verifies bearer tokens and decodes their claims.
pub struct TokenVerifier {
    config: VerifierConfig,
    jwks: JwksManager,
}

impl TokenVerifier {
    pub fn new(config: VerifierConfig, jwks: JwksManager) -> Self {
        Self { config, jwks }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn jwks(&self) -> &JwksManager {
        &self.jwks
    }

    /// Verify `token` and return its claims.
    ///
    /// The token must name a signing key (`kid`) present in the key set, be
    /// signed with one of the configured algorithms, carry the configured
    /// issuer and audience and not be expired.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

        if !self.config.algorithms.contains(&header.alg) {
            tracing::debug!(alg = ?header.alg, "Token signed with a disallowed algorithm");
            return Err(AuthError::MalformedToken);
        }

        let kid = header.kid.ok_or(AuthError::UnknownSigningKey)?;
        let decoding_key = self.jwks.get_decoding_key(&kid).await?;

        let token_data = decode::<Claims>(token, &decoding_key, &self.config.validation(header.alg))
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::ImmatureSignature
                | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
                _ => AuthError::MalformedToken,
            })?;

        Ok(token_data.claims)
    }
}
