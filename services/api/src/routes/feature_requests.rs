//! Feature request routes

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use market::models::{FeatureDecision, FeatureStatus, NewFeatureRequest};
use serde_json::json;
use uuid::Uuid;

use crate::{error::ApiResult, middleware::AuthUser, state::AppState};

/// Ask for one of the caller's listings to be featured
pub async fn request_feature(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewFeatureRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let request = state.feature_requests.request(user.id, payload).await?;

    Ok(Json(json!({
        "message": "Feature request submitted",
        "feature_request": request,
    })))
}

pub async fn list_feature_requests(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let requests = state.feature_requests.list().await?;
    Ok(Json(requests))
}

/// Approve or deny a feature request
pub async fn decide_feature_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<FeatureDecision>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(decision) = payload?;
    let request = state.feature_requests.decide(id, decision).await?;

    let message = match request.request.status {
        FeatureStatus::Approved => "Feature request approved",
        FeatureStatus::Denied => "Feature request denied",
        FeatureStatus::Pending => "Feature request pending",
    };

    Ok(Json(json!({
        "message": message,
        "feature_request": request,
    })))
}
