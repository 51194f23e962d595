//! Authentication service routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::jwt::{Claims, TokenType};
use market::models::{Account, LoginCredentials, RegisterRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AuthError, AuthResult},
    state::AppState,
};

/// Response for token generation
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request carrying a refresh token
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub account: Account,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/accounts/register", post(register))
        .route("/accounts/login", post(login))
        .route("/accounts/refresh", post(refresh_token))
        .route("/accounts/logout", post(logout))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "service": "auth-service" })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "service": "auth-service" })),
            )
        }
    }
}

/// Account registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let account = state.accounts.register(payload).await?;

    Ok(Json(json!({
        "message": "Account created",
        "account": account,
    })))
}

/// Login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginCredentials>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(credentials) = payload?;
    let account = state.accounts.authenticate(credentials).await?;

    let roles = state.roles_for(&account.email);
    let tokens = issue_tokens(&state, account.id, &roles)?;
    info!("Login for account {} with roles {:?}", account.id, roles);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        account,
        tokens,
    }))
}

/// Refresh token endpoint
///
/// Issues a new access token and rotates the refresh token.
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let claims = valid_refresh_claims(&state, &payload.refresh_token).await?;

    // Banned accounts lose their sessions on the next refresh
    let account = state.accounts.active_account(claims.sub).await?;
    let roles = state.roles_for(&account.email);

    let access_token = state
        .jwt_service
        .generate_access_token(account.id, &roles)
        .map_err(|e| AuthError::Internal(format!("Failed to generate access token: {}", e)))?;

    let refresh_token = state
        .jwt_service
        .rotate_refresh_token(state.cache.as_ref(), account.id, &payload.refresh_token)
        .await
        .map_err(|e| AuthError::Internal(format!("Failed to rotate refresh token: {}", e)))?;

    info!("Rotated refresh token for account {}", account.id);
    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Logout endpoint
///
/// Revokes the refresh token, and the bearer access token when one is sent.
pub async fn logout(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let claims = valid_refresh_claims(&state, &payload.refresh_token).await?;

    revoke(&state, &payload.refresh_token, claims.exp).await?;

    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        match state.jwt_service.validate_token(bearer.token()) {
            Ok(access) if access.token_type == TokenType::Access && access.sub == claims.sub => {
                revoke(&state, bearer.token(), access.exp).await?;
            }
            _ => warn!("Ignoring unusable access token on logout"),
        }
    }

    info!("Account {} logged out", claims.sub);
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

fn issue_tokens(state: &AppState, account_id: Uuid, roles: &[String]) -> AuthResult<TokenResponse> {
    let access_token = state
        .jwt_service
        .generate_access_token(account_id, roles)
        .map_err(|e| AuthError::Internal(format!("Failed to generate access token: {}", e)))?;

    let refresh_token = state
        .jwt_service
        .generate_refresh_token(account_id)
        .map_err(|e| AuthError::Internal(format!("Failed to generate refresh token: {}", e)))?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    })
}

/// Validate a refresh token that has not been revoked
async fn valid_refresh_claims(state: &AppState, token: &str) -> AuthResult<Claims> {
    let claims = state
        .jwt_service
        .validate_token(token)
        .map_err(|_| AuthError::invalid_token())?;

    if claims.token_type != TokenType::Refresh {
        return Err(AuthError::invalid_token());
    }

    let is_blacklisted = state
        .jwt_service
        .is_token_blacklisted(state.cache.as_ref(), token)
        .await
        .map_err(|e| AuthError::Internal(format!("Failed to check token denylist: {}", e)))?;

    if is_blacklisted {
        return Err(AuthError::invalid_token());
    }

    Ok(claims)
}

async fn revoke(state: &AppState, token: &str, exp: u64) -> AuthResult<()> {
    state
        .jwt_service
        .blacklist_token(state.cache.as_ref(), token, exp)
        .await
        .map_err(|e| AuthError::Internal(format!("Failed to blacklist token: {}", e)))
}
