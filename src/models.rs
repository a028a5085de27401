// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the drinks API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! ## Views
//!
//! A [`Drink`] is rendered in two shapes:
//!
//! - **short** ([`DrinkShort`]): `id` and `title` only, for public callers
//! - **long** ([`DrinkLong`]): the full recipe, for callers holding
//!   `get:drinks-detail`

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Drink
// =============================================================================

/// One ingredient of a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Ingredient {
    /// Ingredient name, e.g. "Milk".
    pub name: String,
    /// Display color, e.g. "white".
    pub color: String,
    /// Relative amount.
    pub parts: u32,
}

/// A stored drink.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Drink {
    /// Identifier assigned by the store.
    pub id: u64,
    /// Unique title.
    pub title: String,
    /// Ingredients in pour order.
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

/// Public view of a drink.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DrinkShort {
    pub id: u64,
    pub title: String,
}

/// Detailed view of a drink, including the recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DrinkLong {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

// =============================================================================
// Requests
// =============================================================================

/// A recipe as submitted: a single ingredient or a list of them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipeInput {
    pub fn into_ingredients(self) -> Vec<Ingredient> {
        match self {
            RecipeInput::Many(ingredients) => ingredients,
            RecipeInput::One(ingredient) => vec![ingredient],
        }
    }
}

/// Body of `POST /drinks`. Both fields are required; they are optional here
/// so that a missing field is reported as 422 rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

/// Body of `PATCH /drinks/{id}`. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksResponse {
    pub success: bool,
    pub drinks: Vec<DrinkShort>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinkDetailsResponse {
    pub success: bool,
    pub drinks: Vec<DrinkLong>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDrinkResponse {
    pub success: bool,
    pub message: String,
    pub drinks: DrinkShort,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    /// Identifier of the removed drink.
    pub delete: u64,
}
