// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{Permission, PermissionGate, TokenVerifier};
use crate::storage::DrinkStore;

#[derive(Clone)]
pub struct AppState {
    pub drinks: Arc<DrinkStore>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(drinks: DrinkStore, verifier: TokenVerifier) -> Self {
        Self {
            drinks: Arc::new(drinks),
            verifier: Arc::new(verifier),
        }
    }

    /// Gate state for a route requiring `permission`.
    pub fn gate(&self, permission: Permission) -> PermissionGate {
        PermissionGate::new(Arc::clone(&self.verifier), permission)
    }
}
