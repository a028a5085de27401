// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Drink endpoints.
//!
//! Permission checks happen in the per-route gate (see [`super::router`]);
//! handlers only read the verified claims for logging.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::{
    auth::Auth,
    error::{ApiError, ErrorBody},
    models::{
        CreateDrinkRequest, CreateDrinkResponse, DeleteDrinkResponse, DrinkDetailsResponse,
        DrinksResponse, UpdateDrinkRequest,
    },
    state::AppState,
    storage::{DrinkChanges, NewDrink, StoreError},
};

/// Path ids that are not integers name no drink.
fn parse_drink_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("drink {raw} not found")))
}

fn read_failure(e: StoreError) -> ApiError {
    tracing::error!(error = %e, "Failed to read drinks");
    ApiError::internal("internal server error")
}

fn write_failure(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound(id) => ApiError::not_found(format!("drink {id} not found")),
        StoreError::TitleTaken(_) | StoreError::BlankTitle => ApiError::unprocessable(e.to_string()),
        other => {
            tracing::error!(error = %other, "Failed to write drink");
            ApiError::unprocessable("unprocessable")
        }
    }
}

#[utoipa::path(
    get,
    path = "/drinks",
    tag = "Drinks",
    responses(
        (status = 200, description = "All drinks, short view", body = DrinksResponse),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_drinks(State(state): State<AppState>) -> Result<Json<DrinksResponse>, ApiError> {
    let drinks = state.drinks.list().map_err(read_failure)?;
    Ok(Json(DrinksResponse {
        success: true,
        drinks: drinks.iter().map(|d| d.short()).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = "Drinks",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All drinks with recipes", body = DrinkDetailsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Token lacks get:drinks-detail", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_drink_details(
    State(state): State<AppState>,
    Auth(claims): Auth,
) -> Result<Json<DrinkDetailsResponse>, ApiError> {
    tracing::debug!(subject = claims.subject(), "Listing drink details");
    let drinks = state.drinks.list().map_err(read_failure)?;
    Ok(Json(DrinkDetailsResponse {
        success: true,
        drinks: drinks.iter().map(|d| d.long()).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/drinks",
    tag = "Drinks",
    security(("bearer" = [])),
    request_body = CreateDrinkRequest,
    responses(
        (status = 200, description = "Drink created", body = CreateDrinkResponse),
        (status = 400, description = "Body is not JSON", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Token lacks post:drinks", body = ErrorBody),
        (status = 422, description = "Missing field or duplicate title", body = ErrorBody)
    )
)]
pub async fn create_drink(
    State(state): State<AppState>,
    Auth(claims): Auth,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<CreateDrinkResponse>, ApiError> {
    let Json(request) = payload?;
    let (Some(title), Some(recipe)) = (request.title, request.recipe) else {
        return Err(ApiError::unprocessable("title and recipe are required"));
    };

    let drink = state
        .drinks
        .insert(NewDrink {
            title,
            recipe: recipe.into_ingredients(),
        })
        .map_err(write_failure)?;

    tracing::info!(drink_id = drink.id, subject = claims.subject(), "Drink created");
    Ok(Json(CreateDrinkResponse {
        success: true,
        message: format!("{} listed successfully", drink.title),
        drinks: drink.short(),
    }))
}

#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    tag = "Drinks",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "Drink identifier")),
    request_body = UpdateDrinkRequest,
    responses(
        (status = 200, description = "Drink updated", body = DrinksResponse),
        (status = 400, description = "Body is not JSON", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Token lacks patch:drinks", body = ErrorBody),
        (status = 404, description = "No such drink", body = ErrorBody),
        (status = 422, description = "Update rejected", body = ErrorBody)
    )
)]
pub async fn update_drink(
    State(state): State<AppState>,
    Auth(claims): Auth,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse>, ApiError> {
    let id = parse_drink_id(&id)?;
    let Json(request) = payload?;

    let drink = state
        .drinks
        .update(
            id,
            DrinkChanges {
                title: request.title,
                recipe: request.recipe.map(|r| r.into_ingredients()),
            },
        )
        .map_err(write_failure)?;

    tracing::info!(drink_id = drink.id, subject = claims.subject(), "Drink updated");
    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink.short()],
    }))
}

#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    tag = "Drinks",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "Drink identifier")),
    responses(
        (status = 200, description = "Drink deleted", body = DeleteDrinkResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Token lacks delete:drinks", body = ErrorBody),
        (status = 404, description = "No such drink", body = ErrorBody),
        (status = 422, description = "Delete failed", body = ErrorBody)
    )
)]
pub async fn delete_drink(
    State(state): State<AppState>,
    Auth(claims): Auth,
    Path(id): Path<String>,
) -> Result<Json<DeleteDrinkResponse>, ApiError> {
    let id = parse_drink_id(&id)?;
    state.drinks.delete(id).map_err(write_failure)?;

    tracing::info!(drink_id = id, subject = claims.subject(), "Drink deleted");
    Ok(Json(DeleteDrinkResponse {
        success: true,
        delete: id,
    }))
}
