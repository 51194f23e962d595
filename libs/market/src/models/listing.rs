//! Listing model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountSummary, deserialize_some};
use crate::error::{StoreError, StoreResult};

/// Listing entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    /// Hourly price
    pub price: f64,
    pub city: String,
    pub neighborhood: Option<String>,
    pub images: Vec<String>,
    /// Star rating, 0 to 5, set by moderators only
    pub rating: i32,
    pub featured: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Listing joined with its owner's public summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingWithOwner {
    #[serde(flatten)]
    pub listing: Listing,
    pub owner: AccountSummary,
}

/// Which listings a read should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFilter {
    /// Active listings only, featured first, then newest first
    Public,
    /// One owner's listings in any state, newest first
    Owner(Uuid),
    /// Every listing, newest first
    All,
}

/// Query string for the public listing endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    pub owner: Option<Uuid>,
}

impl ListingQuery {
    pub fn filter(&self) -> ListingFilter {
        match self.owner {
            Some(owner_id) => ListingFilter::Owner(owner_id),
            None => ListingFilter::Public,
        }
    }
}

/// Listing creation payload
///
/// Rating, featured and active are not accepted here: a new listing
/// always starts unrated, not featured and active.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewListing {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Validated listing content ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub city: String,
    pub neighborhood: Option<String>,
    pub images: Vec<String>,
}

/// Owner update payload; only supplied fields change
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub city: Option<String>,
    /// `null` clears the neighborhood, absence leaves it untouched
    #[serde(default, deserialize_with = "deserialize_some")]
    pub neighborhood: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    pub active: Option<bool>,
}

/// Moderator update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModeratorListingPatch {
    pub rating: Option<i32>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
}

/// Field changes applied by the store; `None` means unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub city: Option<String>,
    pub neighborhood: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    pub rating: Option<i32>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
}

impl ListingChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the changes to an in-memory listing
    pub fn apply(&self, listing: &mut Listing) {
        if let Some(title) = &self.title {
            listing.title = title.clone();
        }
        if let Some(description) = &self.description {
            listing.description = description.clone();
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(city) = &self.city {
            listing.city = city.clone();
        }
        if let Some(neighborhood) = &self.neighborhood {
            listing.neighborhood = neighborhood.clone();
        }
        if let Some(images) = &self.images {
            listing.images = images.clone();
        }
        if let Some(rating) = self.rating {
            listing.rating = rating;
        }
        if let Some(featured) = self.featured {
            listing.featured = featured;
        }
        if let Some(active) = self.active {
            listing.active = active;
        }
    }
}

/// Serialize the image list into the single text column it is stored in
pub fn encode_images(images: &[String]) -> String {
    serde_json::Value::from(images.to_vec()).to_string()
}

/// Parse the stored image column back into a list
pub fn decode_images(raw: &str) -> StoreResult<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| StoreError::Corrupt(format!("listing images are not a JSON string array: {}", e)))
}
