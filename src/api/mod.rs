// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderName,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_permission, Permission},
    error::{route_not_found, ErrorBody},
    models::{
        CreateDrinkRequest, CreateDrinkResponse, DeleteDrinkResponse, Drink, DrinkDetailsResponse,
        DrinkLong, DrinkShort, DrinksResponse, Ingredient, RecipeInput, UpdateDrinkRequest,
    },
    state::AppState,
};

pub mod drinks;
pub mod health;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/drinks", get(drinks::list_drinks))
        .route(
            "/drinks",
            post(drinks::create_drink).route_layer(from_fn_with_state(
                state.gate(Permission::PostDrinks),
                require_permission,
            )),
        )
        .route(
            "/drinks-detail",
            get(drinks::list_drink_details).route_layer(from_fn_with_state(
                state.gate(Permission::GetDrinksDetail),
                require_permission,
            )),
        )
        .route(
            "/drinks/{id}",
            patch(drinks::update_drink).route_layer(from_fn_with_state(
                state.gate(Permission::PatchDrinks),
                require_permission,
            )),
        )
        .route(
            "/drinks/{id}",
            delete(drinks::delete_drink).route_layer(from_fn_with_state(
                state.gate(Permission::DeleteDrinks),
                require_permission,
            )),
        )
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        drinks::list_drinks,
        drinks::list_drink_details,
        drinks::create_drink,
        drinks::update_drink,
        drinks::delete_drink,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Drink,
            DrinkShort,
            DrinkLong,
            Ingredient,
            RecipeInput,
            CreateDrinkRequest,
            UpdateDrinkRequest,
            DrinksResponse,
            DrinkDetailsResponse,
            CreateDrinkResponse,
            DeleteDrinkResponse,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Drinks", description = "Drink menu and recipes"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
