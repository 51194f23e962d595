//! Marketplace domain models and request payloads

pub mod account;
pub mod feature_request;
pub mod listing;

pub use account::{
    Account, AccountRecord, AccountSummary, AccountWithListingCount, BanUpdate, LoginCredentials,
    RegisterRequest,
};
pub use feature_request::{
    FeatureDecision, FeatureRequest, FeatureRequestView, FeatureStatus, NewFeatureRequest,
};
pub use listing::{
    Listing, ListingChanges, ListingDraft, ListingFilter, ListingPatch, ListingQuery,
    ListingWithOwner, ModeratorListingPatch, NewListing,
};

use serde::{Deserialize, Deserializer};

/// Deserialize a present field as `Some`, so that together with
/// `#[serde(default)]` an absent field stays `None` while an explicit
/// `null` becomes `Some(None)`.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
