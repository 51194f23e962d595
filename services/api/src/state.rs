//! Application state shared across handlers

use std::sync::Arc;

use common::{cache::Cache, jwt::JwtService};
use market::{
    operations::{FeatureRequestService, ListingService, ModerationService},
    store::MarketStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MarketStore>,
    pub listings: ListingService,
    pub feature_requests: FeatureRequestService,
    pub moderation: ModerationService,
    pub jwt_service: JwtService,
    pub cache: Arc<dyn Cache>,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketStore>, jwt_service: JwtService, cache: Arc<dyn Cache>) -> Self {
        Self {
            listings: ListingService::new(store.clone()),
            feature_requests: FeatureRequestService::new(store.clone()),
            moderation: ModerationService::new(store.clone()),
            store,
            jwt_service,
            cache,
        }
    }
}
