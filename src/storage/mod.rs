// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence for drinks in a single embedded redb file. Handlers talk to
//! [`DrinkStore`] directly; redb transactions serialize concurrent writers.

pub mod drinks;

pub use drinks::{DrinkChanges, DrinkStore, NewDrink, StoreError, StoreResult};
