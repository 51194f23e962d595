//! Moderator operations on accounts and listings
//!
//! Callers are expected to have checked the admin role already.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{MarketError, MarketResult};
use crate::models::{
    Account, AccountWithListingCount, BanUpdate, ListingChanges, ListingFilter, ListingWithOwner,
    ModeratorListingPatch,
};
use crate::store::MarketStore;
use crate::validation::validate_rating;

#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn MarketStore>,
}

impl ModerationService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Every account, newest first, with its listing count
    pub async fn list_accounts(&self) -> MarketResult<Vec<AccountWithListingCount>> {
        Ok(self.store.list_accounts_with_counts().await?)
    }

    /// Ban or unban an account
    pub async fn set_banned(&self, id: Uuid, update: BanUpdate) -> MarketResult<Account> {
        let Some(Value::Bool(banned)) = update.banned else {
            return Err(MarketError::invalid("Banned must be a boolean"));
        };

        let account = self
            .store
            .set_account_banned(id, banned)
            .await?
            .ok_or_else(|| MarketError::not_found("Account not found"))?;

        if banned {
            warn!("Account {} banned", id);
        } else {
            info!("Account {} unbanned", id);
        }
        Ok(account)
    }

    /// Every listing regardless of the active flag, newest first
    pub async fn list_listings(&self) -> MarketResult<Vec<ListingWithOwner>> {
        Ok(self.store.list_listings(ListingFilter::All).await?)
    }

    pub async fn edit_listing(
        &self,
        id: Uuid,
        patch: ModeratorListingPatch,
    ) -> MarketResult<ListingWithOwner> {
        let changes = ListingChanges {
            rating: patch.rating.map(validate_rating).transpose()?,
            featured: patch.featured,
            active: patch.active,
            ..Default::default()
        };

        let listing = self
            .store
            .update_listing(id, &changes)
            .await?
            .ok_or_else(|| MarketError::not_found("Listing not found"))?;

        info!("Moderator updated listing {}", id);
        Ok(listing)
    }

    /// Delete any listing along with its feature requests
    pub async fn delete_listing(&self, id: Uuid) -> MarketResult<()> {
        if !self.store.delete_listing(id).await? {
            return Err(MarketError::not_found("Listing not found"));
        }

        info!("Moderator deleted listing {}", id);
        Ok(())
    }
}
