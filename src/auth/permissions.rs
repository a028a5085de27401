// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permissions understood by the drinks API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Permission strings granted by the identity provider.
///
/// The provider places these in the token's `permissions` claim; each gated
/// route requires exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    /// Read the full recipe of every drink
    #[serde(rename = "get:drinks-detail")]
    GetDrinksDetail,
    /// Create drinks
    #[serde(rename = "post:drinks")]
    PostDrinks,
    /// Edit drinks
    #[serde(rename = "patch:drinks")]
    PatchDrinks,
    /// Remove drinks
    #[serde(rename = "delete:drinks")]
    DeleteDrinks,
}

impl Permission {
    /// Wire form as it appears in the `permissions` claim.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::GetDrinksDetail => "get:drinks-detail",
            Permission::PostDrinks => "post:drinks",
            Permission::PatchDrinks => "patch:drinks",
            Permission::DeleteDrinks => "delete:drinks",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
