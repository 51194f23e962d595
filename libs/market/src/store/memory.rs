//! In-process implementation of the marketplace store
//!
//! Mirrors the PostgreSQL constraints that matter to the operations: email
//! uniqueness, one pending feature request per listing, cascading deletes
//! and the read orderings.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ACCOUNT_EMAIL_CONSTRAINT, MarketStore, ONE_PENDING_CONSTRAINT};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Account, AccountRecord, AccountWithListingCount, FeatureRequest, FeatureRequestView,
    FeatureStatus, Listing, ListingChanges, ListingDraft, ListingFilter, ListingWithOwner,
};

#[derive(Default)]
struct Tables {
    accounts: Vec<AccountRecord>,
    listings: Vec<Listing>,
    feature_requests: Vec<FeatureRequest>,
}

impl Tables {
    fn join_owner(&self, listing: &Listing) -> StoreResult<ListingWithOwner> {
        let owner = self
            .accounts
            .iter()
            .find(|a| a.id == listing.owner_id)
            .ok_or_else(|| StoreError::Corrupt(format!("listing {} has no owner", listing.id)))?;

        Ok(ListingWithOwner {
            listing: listing.clone(),
            owner: owner.public().summary(),
        })
    }

    fn view(&self, request: &FeatureRequest) -> StoreResult<FeatureRequestView> {
        let listing = self
            .listings
            .iter()
            .find(|l| l.id == request.listing_id)
            .ok_or_else(|| {
                StoreError::Corrupt(format!("feature request {} has no listing", request.id))
            })?;

        Ok(FeatureRequestView {
            request: request.clone(),
            listing: self.join_owner(listing)?,
        })
    }
}

/// Marketplace store held in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn account_count(&self) -> usize {
        self.tables.lock().await.accounts.len()
    }

    /// Number of stored feature requests
    pub async fn feature_request_count(&self) -> usize {
        self.tables.lock().await.feature_requests.len()
    }
}

/// Newest first; ties keep the later insertion first.
fn newest_first<T: Clone>(items: &[T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut sorted: Vec<T> = items.iter().rev().cloned().collect();
    sorted.sort_by_key(|item| Reverse(created_at(item)));
    sorted
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_account(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> StoreResult<Account> {
        let mut tables = self.tables.lock().await;

        if tables.accounts.iter().any(|a| a.email == email) {
            return Err(StoreError::Conflict(ACCOUNT_EMAIL_CONSTRAINT.to_string()));
        }

        let record = AccountRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.map(str::to_string),
            password_hash: password_hash.to_string(),
            banned: false,
            created_at: Utc::now(),
        };
        let account = record.public();
        tables.accounts.push(record);

        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AccountRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.id == id)
            .map(AccountRecord::public))
    }

    async fn list_accounts_with_counts(&self) -> StoreResult<Vec<AccountWithListingCount>> {
        let tables = self.tables.lock().await;

        Ok(newest_first(&tables.accounts, |a| a.created_at)
            .iter()
            .map(|record| AccountWithListingCount {
                account: record.public(),
                listing_count: tables
                    .listings
                    .iter()
                    .filter(|l| l.owner_id == record.id)
                    .count() as i64,
            })
            .collect())
    }

    async fn set_account_banned(&self, id: Uuid, banned: bool) -> StoreResult<Option<Account>> {
        let mut tables = self.tables.lock().await;

        Ok(tables
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .map(|record| {
                record.banned = banned;
                record.public()
            }))
    }

    async fn insert_listing(&self, owner_id: Uuid, draft: &ListingDraft) -> StoreResult<Listing> {
        let mut tables = self.tables.lock().await;

        if !tables.accounts.iter().any(|a| a.id == owner_id) {
            return Err(StoreError::Corrupt(format!(
                "owner {} does not exist",
                owner_id
            )));
        }

        let listing = Listing {
            id: Uuid::new_v4(),
            owner_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            price: draft.price,
            city: draft.city.clone(),
            neighborhood: draft.neighborhood.clone(),
            images: draft.images.clone(),
            rating: 0,
            featured: false,
            active: true,
            created_at: Utc::now(),
        };
        tables.listings.push(listing.clone());

        Ok(listing)
    }

    async fn find_listing(&self, id: Uuid) -> StoreResult<Option<ListingWithOwner>> {
        let tables = self.tables.lock().await;
        tables
            .listings
            .iter()
            .find(|l| l.id == id)
            .map(|l| tables.join_owner(l))
            .transpose()
    }

    async fn list_listings(&self, filter: ListingFilter) -> StoreResult<Vec<ListingWithOwner>> {
        let tables = self.tables.lock().await;

        let mut listings = newest_first(&tables.listings, |l| l.created_at);
        match filter {
            ListingFilter::Public => {
                listings.retain(|l| l.active);
                listings.sort_by_key(|l| !l.featured);
            }
            ListingFilter::Owner(owner_id) => listings.retain(|l| l.owner_id == owner_id),
            ListingFilter::All => {}
        }

        listings.iter().map(|l| tables.join_owner(l)).collect()
    }

    async fn update_listing(
        &self,
        id: Uuid,
        changes: &ListingChanges,
    ) -> StoreResult<Option<ListingWithOwner>> {
        let mut tables = self.tables.lock().await;

        let Some(listing) = tables.listings.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        changes.apply(listing);
        let listing = listing.clone();

        tables.join_owner(&listing).map(Some)
    }

    async fn delete_listing(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;

        let before = tables.listings.len();
        tables.listings.retain(|l| l.id != id);
        if tables.listings.len() == before {
            return Ok(false);
        }

        tables.feature_requests.retain(|f| f.listing_id != id);
        Ok(true)
    }

    async fn find_pending_feature_request(
        &self,
        listing_id: Uuid,
    ) -> StoreResult<Option<FeatureRequest>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .feature_requests
            .iter()
            .find(|f| f.listing_id == listing_id && f.status == FeatureStatus::Pending)
            .cloned())
    }

    async fn insert_feature_request(
        &self,
        listing_id: Uuid,
        account_id: Uuid,
    ) -> StoreResult<FeatureRequest> {
        let mut tables = self.tables.lock().await;

        if tables
            .feature_requests
            .iter()
            .any(|f| f.listing_id == listing_id && f.status == FeatureStatus::Pending)
        {
            return Err(StoreError::Conflict(ONE_PENDING_CONSTRAINT.to_string()));
        }

        let request = FeatureRequest {
            id: Uuid::new_v4(),
            listing_id,
            account_id,
            status: FeatureStatus::Pending,
            created_at: Utc::now(),
        };
        tables.feature_requests.push(request.clone());

        Ok(request)
    }

    async fn find_feature_request(&self, id: Uuid) -> StoreResult<Option<FeatureRequestView>> {
        let tables = self.tables.lock().await;
        tables
            .feature_requests
            .iter()
            .find(|f| f.id == id)
            .map(|f| tables.view(f))
            .transpose()
    }

    async fn list_feature_requests(&self) -> StoreResult<Vec<FeatureRequestView>> {
        let tables = self.tables.lock().await;
        newest_first(&tables.feature_requests, |f| f.created_at)
            .iter()
            .map(|f| tables.view(f))
            .collect()
    }

    async fn decide_feature_request(
        &self,
        id: Uuid,
        status: FeatureStatus,
    ) -> StoreResult<Option<FeatureRequest>> {
        let mut tables = self.tables.lock().await;

        let Some(request) = tables
            .feature_requests
            .iter_mut()
            .find(|f| f.id == id && f.status == FeatureStatus::Pending)
        else {
            return Ok(None);
        };
        request.status = status;
        let request = request.clone();

        if status == FeatureStatus::Approved {
            if let Some(listing) = tables
                .listings
                .iter_mut()
                .find(|l| l.id == request.listing_id)
            {
                listing.featured = true;
            }
        }

        Ok(Some(request))
    }
}
