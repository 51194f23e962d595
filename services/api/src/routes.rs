//! API service routes

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tracing::warn;

use crate::{
    middleware::{admin_middleware, auth_middleware},
    state::AppState,
};

pub mod admin;
pub mod feature_requests;
pub mod listings;

/// Create the router for the API service
///
/// `max_body_bytes` caps listing create and update bodies, which carry
/// images inline. Other routes keep axum's default limit.
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    let listing_routes = Router::new()
        .route("/listings", post(listings::create_listing))
        .route(
            "/listings/:id",
            put(listings::update_listing).delete(listings::delete_listing),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes));

    let member_routes = Router::new()
        .route(
            "/feature-requests",
            post(feature_requests::request_feature),
        )
        .merge(listing_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route(
            "/feature-requests",
            get(feature_requests::list_feature_requests),
        )
        .route(
            "/feature-requests/:id",
            put(feature_requests::decide_feature_request),
        )
        .route("/admin/accounts", get(admin::list_accounts))
        .route("/admin/accounts/:id", put(admin::set_account_banned))
        .route("/admin/listings", get(admin::list_listings))
        .route(
            "/admin/listings/:id",
            put(admin::edit_listing).delete(admin::delete_listing),
        )
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/listings", get(listings::list_listings))
        .route("/listings/:id", get(listings::get_listing))
        .merge(member_routes)
        .merge(admin_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "service": "api-service" })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "service": "api-service" })),
            )
        }
    }
}
