//! Listing routes for the public view and for owners

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::IntoResponse,
};
use market::models::{ListingPatch, ListingQuery, NewListing};
use serde_json::json;
use uuid::Uuid;

use crate::{error::ApiResult, middleware::AuthUser, state::AppState};

/// List an owner's listings, or the active ones with featured first
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> ApiResult<impl IntoResponse> {
    let listings = state.listings.list(query.filter()).await?;
    Ok(Json(listings))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let listing = state.listings.get(id).await?;
    Ok(Json(listing))
}

/// Create a listing owned by the caller
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewListing>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let listing = state.listings.create(user.id, payload).await?;

    Ok(Json(json!({
        "message": "Listing created",
        "listing": listing,
    })))
}

pub async fn update_listing(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ListingPatch>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(patch) = payload?;
    let listing = state.listings.update(user.id, id, patch).await?;

    Ok(Json(json!({
        "message": "Listing updated",
        "listing": listing,
    })))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.listings.delete(user.id, id).await?;
    Ok(Json(json!({ "message": "Listing deleted" })))
}
