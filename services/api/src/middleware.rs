//! Authentication middleware for JWT token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::jwt::{ADMIN_ROLE, TokenType};
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Authenticated account information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == ADMIN_ROLE)
    }
}

/// Authentication middleware
///
/// Puts the [`AuthUser`] of a valid, unrevoked access token into the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let user = authenticate(&state, bearer.token()).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Admin middleware; must run after [`auth_middleware`]
pub async fn admin_middleware(req: Request, next: Next) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    require_admin(user)?;

    Ok(next.run(req).await)
}

/// Resolve an access token into the account it was issued to
pub async fn authenticate(state: &AppState, token: &str) -> ApiResult<AuthUser> {
    let invalid = || ApiError::Unauthorized("Invalid or expired token".to_string());

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        warn!("Failed to validate token: {}", e);
        invalid()
    })?;

    if claims.token_type != TokenType::Access {
        return Err(invalid());
    }

    let is_blacklisted = state
        .jwt_service
        .is_token_blacklisted(state.cache.as_ref(), token)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to check token denylist: {}", e)))?;

    if is_blacklisted {
        return Err(invalid());
    }

    Ok(AuthUser {
        id: claims.sub,
        roles: claims.roles,
    })
}

pub fn require_admin(user: &AuthUser) -> ApiResult<()> {
    if !user.is_admin() {
        warn!("Account {} attempted an admin operation", user.id);
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }
    Ok(())
}
