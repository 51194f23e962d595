//! Shared fixtures for handler tests

use std::sync::Arc;

use axum::{body::to_bytes, response::Response};
use common::{
    cache::MemoryCache,
    jwt::{JwtConfig, JwtKeys, JwtService},
};
use market::{
    models::{ListingDraft, ListingWithOwner},
    store::{MarketStore, MemoryStore},
};
use serde_json::Value;

use crate::{middleware::AuthUser, state::AppState};

pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let jwt_service = JwtService::new(JwtConfig {
        keys: JwtKeys::Secret("test-secret".to_string()),
        access_token_expiry: 900,
        refresh_token_expiry: 3600,
    })
    .unwrap();

    let state = AppState::new(store.clone(), jwt_service, Arc::new(MemoryCache::new()));
    (state, store)
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Store an account and return it as an authenticated member
pub async fn member(store: &MemoryStore, email: &str) -> AuthUser {
    let account = store.insert_account(email, None, "hash").await.unwrap();
    AuthUser {
        id: account.id,
        roles: vec![],
    }
}

pub async fn stored_listing(store: &MemoryStore, owner: &AuthUser) -> ListingWithOwner {
    let listing = store
        .insert_listing(
            owner.id,
            &ListingDraft {
                title: "Listing".to_string(),
                description: "Description".to_string(),
                price: 80.0,
                city: "City".to_string(),
                neighborhood: None,
                images: vec!["photo.jpg".to_string()],
            },
        )
        .await
        .unwrap();

    store.find_listing(listing.id).await.unwrap().unwrap()
}
