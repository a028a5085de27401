// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims issued by the identity provider.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// `aud` may be a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Default for Audience {
    fn default() -> Self {
        Audience::Many(Vec::new())
    }
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(aud) => aud == audience,
            Audience::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Claims of a verified access token.
///
/// Signature, `iss`, `aud` and `exp` have already been validated by the time
/// a value of this type exists. The defaults on those fields only let
/// validation report a missing claim instead of a parse error. Claims the
/// service does not model are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (caller identity)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issuer
    #[serde(default)]
    pub iss: String,

    /// Audience
    #[serde(default)]
    pub aud: Audience,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: u64,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    /// Granted permissions, in the order the provider listed them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Whether `permission` is present in the `permissions` claim.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|granted| granted.iter().any(|p| p == permission))
    }

    /// Check the `permissions` claim for `permission`.
    ///
    /// An empty `permission` only requires a verified token.
    pub fn require_permission(&self, permission: &str) -> Result<(), AuthError> {
        if permission.is_empty() {
            return Ok(());
        }

        match &self.permissions {
            None => Err(AuthError::MissingPermissions),
            Some(granted) if granted.iter().any(|p| p == permission) => Ok(()),
            Some(_) => Err(AuthError::PermissionDenied),
        }
    }

    /// Subject for log lines.
    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or("-")
    }
}
