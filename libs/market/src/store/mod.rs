//! Persistence seam for the marketplace
//!
//! [`PgStore`] talks to PostgreSQL; [`MemoryStore`] keeps the same
//! contract in-process and backs the operation and handler tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{
    Account, AccountRecord, AccountWithListingCount, FeatureRequest, FeatureRequestView,
    FeatureStatus, Listing, ListingChanges, ListingDraft, ListingFilter, ListingWithOwner,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Constraint name reported when an email is already registered
pub const ACCOUNT_EMAIL_CONSTRAINT: &str = "accounts_email_key";
/// Constraint name reported when a listing already has a pending request
pub const ONE_PENDING_CONSTRAINT: &str = "feature_requests_one_pending";

#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Check that the backend answers
    async fn ping(&self) -> StoreResult<()>;

    /// Insert an account; a taken email yields `StoreError::Conflict`
    async fn insert_account(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> StoreResult<Account>;

    /// Find an account by email, including its password hash
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AccountRecord>>;

    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>>;

    /// All accounts, newest first, with their listing counts
    async fn list_accounts_with_counts(&self) -> StoreResult<Vec<AccountWithListingCount>>;

    async fn set_account_banned(&self, id: Uuid, banned: bool) -> StoreResult<Option<Account>>;

    /// Insert a listing with rating 0, not featured and active
    async fn insert_listing(&self, owner_id: Uuid, draft: &ListingDraft) -> StoreResult<Listing>;

    async fn find_listing(&self, id: Uuid) -> StoreResult<Option<ListingWithOwner>>;

    async fn list_listings(&self, filter: ListingFilter) -> StoreResult<Vec<ListingWithOwner>>;

    /// Apply the supplied changes; `None` when the listing does not exist
    async fn update_listing(
        &self,
        id: Uuid,
        changes: &ListingChanges,
    ) -> StoreResult<Option<ListingWithOwner>>;

    /// Delete a listing together with its feature requests, atomically.
    /// Returns whether the listing existed.
    async fn delete_listing(&self, id: Uuid) -> StoreResult<bool>;

    async fn find_pending_feature_request(
        &self,
        listing_id: Uuid,
    ) -> StoreResult<Option<FeatureRequest>>;

    /// Insert a pending request; a second pending request for the same
    /// listing yields `StoreError::Conflict`
    async fn insert_feature_request(
        &self,
        listing_id: Uuid,
        account_id: Uuid,
    ) -> StoreResult<FeatureRequest>;

    async fn find_feature_request(&self, id: Uuid) -> StoreResult<Option<FeatureRequestView>>;

    /// All requests, newest first, joined with listing and owner
    async fn list_feature_requests(&self) -> StoreResult<Vec<FeatureRequestView>>;

    /// Move a pending request to `status` and, when approving, mark its
    /// listing featured, in one atomic step. `None` when no pending request
    /// with this id exists.
    async fn decide_feature_request(
        &self,
        id: Uuid,
        status: FeatureStatus,
    ) -> StoreResult<Option<FeatureRequest>>;
}
