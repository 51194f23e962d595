//! Moderation routes for accounts and listings

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use market::models::{BanUpdate, ModeratorListingPatch};
use serde_json::json;
use uuid::Uuid;

use crate::{error::ApiResult, state::AppState};

/// Accounts with their listing counts
pub async fn list_accounts(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let accounts = state.moderation.list_accounts().await?;
    Ok(Json(accounts))
}

pub async fn set_account_banned(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<BanUpdate>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(update) = payload?;
    let account = state.moderation.set_banned(id, update).await?;

    let message = if account.banned {
        "Account banned"
    } else {
        "Account unbanned"
    };

    Ok(Json(json!({
        "message": message,
        "account": account,
    })))
}

pub async fn list_listings(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let listings = state.moderation.list_listings().await?;
    Ok(Json(listings))
}

/// Set rating, featured or active on any listing
pub async fn edit_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ModeratorListingPatch>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(patch) = payload?;
    let listing = state.moderation.edit_listing(id, patch).await?;

    Ok(Json(json!({
        "message": "Listing updated",
        "listing": listing,
    })))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.moderation.delete_listing(id).await?;
    Ok(Json(json!({ "message": "Listing deleted" })))
}
