//! Feature request workflow
//!
//! Owners ask for promotion; moderators approve or deny. At most one
//! request per listing is pending at any time, and a decided request never
//! changes again. A denied listing may be requested again right away.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::listings::owned_listing;
use crate::error::{MarketError, MarketResult, StoreError};
use crate::models::{FeatureDecision, FeatureRequestView, FeatureStatus, NewFeatureRequest};
use crate::store::MarketStore;

const ALREADY_PENDING: &str = "A feature request is already pending for this listing";
const ALREADY_DECIDED: &str = "Feature request has already been decided";

#[derive(Clone)]
pub struct FeatureRequestService {
    store: Arc<dyn MarketStore>,
}

impl FeatureRequestService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Ask for a listing owned by `actor_id` to be featured
    pub async fn request(
        &self,
        actor_id: Uuid,
        payload: NewFeatureRequest,
    ) -> MarketResult<FeatureRequestView> {
        let listing_id = payload
            .listing_id
            .ok_or_else(|| MarketError::invalid("Listing id is required"))?;

        let listing = owned_listing(self.store.as_ref(), actor_id, listing_id).await?;

        if self
            .store
            .find_pending_feature_request(listing_id)
            .await?
            .is_some()
        {
            return Err(MarketError::conflict(ALREADY_PENDING));
        }

        let request = match self
            .store
            .insert_feature_request(listing_id, listing.listing.owner_id)
            .await
        {
            Ok(request) => request,
            Err(StoreError::Conflict(_)) => return Err(MarketError::conflict(ALREADY_PENDING)),
            Err(e) => return Err(e.into()),
        };

        info!(
            "Feature request {} created for listing {}",
            request.id, listing_id
        );
        Ok(FeatureRequestView { request, listing })
    }

    /// Apply a moderator decision
    ///
    /// Setting the status a request already has is a no-op.
    pub async fn decide(
        &self,
        id: Uuid,
        decision: FeatureDecision,
    ) -> MarketResult<FeatureRequestView> {
        let status: FeatureStatus = decision
            .status
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|_| MarketError::invalid("Invalid status"))?;

        let current = self
            .store
            .find_feature_request(id)
            .await?
            .ok_or_else(|| MarketError::not_found("Feature request not found"))?;

        if current.request.status == status {
            return Ok(current);
        }
        if current.request.status.is_terminal() {
            return Err(MarketError::conflict(ALREADY_DECIDED));
        }

        // Lost a race with another moderator between the read and the write.
        if self.store.decide_feature_request(id, status).await?.is_none() {
            return Err(MarketError::conflict(ALREADY_DECIDED));
        }

        info!("Feature request {} marked {}", id, status);
        self.store
            .find_feature_request(id)
            .await?
            .ok_or_else(|| MarketError::not_found("Feature request not found"))
    }

    /// Every request, newest first, for the moderation view
    pub async fn list(&self) -> MarketResult<Vec<FeatureRequestView>> {
        Ok(self.store.list_feature_requests().await?)
    }
}
