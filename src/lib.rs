// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Coffee Shop Drinks API
//!
//! REST service over a single drink resource. Reads of the menu are public;
//! recipe details and every mutation require a bearer token issued by the
//! identity provider and carrying the matching permission.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers, router and OpenAPI document (Axum)
//! - `auth` - Token verification against JWKS and per-route permission gates
//! - `config` - Environment configuration
//! - `storage` - Embedded drink database (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_utils;
