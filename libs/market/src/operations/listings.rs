//! Listing create/read/update/delete for owners

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::accounts::active_account;
use crate::error::{MarketError, MarketResult};
use crate::models::{
    ListingChanges, ListingDraft, ListingFilter, ListingPatch, ListingWithOwner, NewListing,
};
use crate::store::MarketStore;
use crate::validation::{non_blank, optional, required, validate_images, validate_price};

const FIELDS_REQUIRED: &str = "All required fields must be filled in";

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn MarketStore>,
}

impl ListingService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// List one owner's listings, or the public marketplace view
    pub async fn list(&self, filter: ListingFilter) -> MarketResult<Vec<ListingWithOwner>> {
        Ok(self.store.list_listings(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> MarketResult<ListingWithOwner> {
        self.store
            .find_listing(id)
            .await?
            .ok_or_else(|| MarketError::not_found("Listing not found"))
    }

    /// Create a listing owned by `owner_id`
    pub async fn create(&self, owner_id: Uuid, payload: NewListing) -> MarketResult<ListingWithOwner> {
        let draft = ListingDraft {
            title: required(payload.title, FIELDS_REQUIRED)?,
            description: required(payload.description, FIELDS_REQUIRED)?,
            price: validate_price(
                payload
                    .price
                    .ok_or_else(|| MarketError::invalid(FIELDS_REQUIRED))?,
            )?,
            city: required(payload.city, FIELDS_REQUIRED)?,
            neighborhood: optional(payload.neighborhood),
            images: validate_images(payload.images.unwrap_or_default())?,
        };

        let owner = active_account(self.store.as_ref(), owner_id).await?;
        let listing = self.store.insert_listing(owner.id, &draft).await?;

        info!("Created listing {} for account {}", listing.id, owner.id);
        Ok(ListingWithOwner {
            listing,
            owner: owner.summary(),
        })
    }

    /// Apply an owner's partial update
    pub async fn update(
        &self,
        actor_id: Uuid,
        id: Uuid,
        patch: ListingPatch,
    ) -> MarketResult<ListingWithOwner> {
        let changes = ListingChanges {
            title: patch.title.map(|v| non_blank(v, "Title")).transpose()?,
            description: patch
                .description
                .map(|v| non_blank(v, "Description"))
                .transpose()?,
            price: patch.price.map(validate_price).transpose()?,
            city: patch.city.map(|v| non_blank(v, "City")).transpose()?,
            neighborhood: patch.neighborhood.map(optional),
            images: patch.images.map(validate_images).transpose()?,
            active: patch.active,
            ..Default::default()
        };

        owned_listing(self.store.as_ref(), actor_id, id).await?;

        let listing = self
            .store
            .update_listing(id, &changes)
            .await?
            .ok_or_else(|| MarketError::not_found("Listing not found"))?;

        info!("Updated listing {}", id);
        Ok(listing)
    }

    /// Delete a listing owned by `actor_id`
    pub async fn delete(&self, actor_id: Uuid, id: Uuid) -> MarketResult<()> {
        owned_listing(self.store.as_ref(), actor_id, id).await?;

        if !self.store.delete_listing(id).await? {
            return Err(MarketError::not_found("Listing not found"));
        }

        info!("Deleted listing {}", id);
        Ok(())
    }
}

/// Resolve a listing and check that `actor_id` is an active account owning it
pub(crate) async fn owned_listing(
    store: &dyn MarketStore,
    actor_id: Uuid,
    id: Uuid,
) -> MarketResult<ListingWithOwner> {
    active_account(store, actor_id).await?;

    let listing = store
        .find_listing(id)
        .await?
        .ok_or_else(|| MarketError::not_found("Listing not found"))?;

    if listing.listing.owner_id != actor_id {
        return Err(MarketError::forbidden("Not the owner of this listing"));
    }

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Account;
    use crate::store::MemoryStore;

    async fn setup() -> (Arc<MemoryStore>, ListingService, Account) {
        let store = Arc::new(MemoryStore::new());
        let owner = store
            .insert_account("owner@example.com", Some("Owner"), "hash")
            .await
            .unwrap();
        (store.clone(), ListingService::new(store), owner)
    }

    fn payload(title: &str) -> NewListing {
        NewListing {
            title: Some(title.to_string()),
            description: Some("D".to_string()),
            price: Some(100.0),
            city: Some("C".to_string()),
            neighborhood: None,
            images: Some(vec!["x".to_string()]),
        }
    }

    #[tokio::test]
    async fn test_create_starts_unrated_unfeatured_active() {
        let (_, service, owner) = setup().await;

        let created: NewListing = serde_json::from_value(serde_json::json!({
            "title": "T", "description": "D", "price": 100, "city": "C", "images": ["x"],
            "featured": true, "active": false, "rating": 5
        }))
        .unwrap();
        let listing = service.create(owner.id, created).await.unwrap();

        assert!(!listing.listing.featured);
        assert!(listing.listing.active);
        assert_eq!(listing.listing.rating, 0);
        assert_eq!(listing.owner.email, "owner@example.com");
    }

    #[tokio::test]
    async fn test_create_validates_fields_and_owner() {
        let (store, service, owner) = setup().await;

        let no_images = NewListing {
            images: Some(vec![]),
            ..payload("T")
        };
        assert!(matches!(
            service.create(owner.id, no_images).await,
            Err(MarketError::InvalidInput(_))
        ));

        let no_title = NewListing {
            title: None,
            ..payload("T")
        };
        assert!(matches!(
            service.create(owner.id, no_title).await,
            Err(MarketError::InvalidInput(_))
        ));

        let zero_price = NewListing {
            price: Some(0.0),
            ..payload("T")
        };
        assert!(matches!(
            service.create(owner.id, zero_price).await,
            Err(MarketError::InvalidInput(_))
        ));

        assert!(matches!(
            service.create(Uuid::new_v4(), payload("T")).await,
            Err(MarketError::NotFound(_))
        ));

        store.set_account_banned(owner.id, true).await.unwrap();
        assert!(matches!(
            service.create(owner.id, payload("T")).await,
            Err(MarketError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_public_view_puts_featured_first() {
        let (store, service, owner) = setup().await;

        let plain_old = service.create(owner.id, payload("old")).await.unwrap();
        let featured = service.create(owner.id, payload("featured")).await.unwrap();
        let plain_new = service.create(owner.id, payload("new")).await.unwrap();
        let hidden = service.create(owner.id, payload("hidden")).await.unwrap();

        store
            .update_listing(
                featured.listing.id,
                &ListingChanges {
                    featured: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        service
            .update(
                owner.id,
                hidden.listing.id,
                ListingPatch {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let public: Vec<Uuid> = service
            .list(ListingFilter::Public)
            .await
            .unwrap()
            .iter()
            .map(|l| l.listing.id)
            .collect();
        assert_eq!(
            public,
            vec![featured.listing.id, plain_new.listing.id, plain_old.listing.id]
        );

        let mine = service.list(ListingFilter::Owner(owner.id)).await.unwrap();
        assert_eq!(mine.len(), 4);
        assert_eq!(mine[0].listing.id, hidden.listing.id);
    }

    #[tokio::test]
    async fn test_update_only_touches_supplied_fields() {
        let (_, service, owner) = setup().await;
        let created = service.create(owner.id, payload("T")).await.unwrap();

        let patch: ListingPatch =
            serde_json::from_value(serde_json::json!({ "neighborhood": "Jardins" })).unwrap();
        let updated = service
            .update(owner.id, created.listing.id, patch)
            .await
            .unwrap();

        assert_eq!(updated.listing.neighborhood.as_deref(), Some("Jardins"));
        assert_eq!(updated.listing.title, created.listing.title);
        assert_eq!(updated.listing.description, created.listing.description);
        assert_eq!(updated.listing.price, created.listing.price);
        assert_eq!(updated.listing.city, created.listing.city);
        assert!(updated.listing.active);

        let cleared: ListingPatch =
            serde_json::from_value(serde_json::json!({ "neighborhood": null, "active": false }))
                .unwrap();
        let updated = service
            .update(owner.id, created.listing.id, cleared)
            .await
            .unwrap();
        assert_eq!(updated.listing.neighborhood, None);
        assert!(!updated.listing.active);
    }

    #[tokio::test]
    async fn test_update_and_delete_require_ownership() {
        let (store, service, owner) = setup().await;
        let stranger = store
            .insert_account("stranger@example.com", None, "hash")
            .await
            .unwrap();
        let created = service.create(owner.id, payload("T")).await.unwrap();

        assert!(matches!(
            service
                .update(stranger.id, created.listing.id, ListingPatch::default())
                .await,
            Err(MarketError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete(stranger.id, created.listing.id).await,
            Err(MarketError::Forbidden(_))
        ));

        assert!(matches!(
            service
                .update(
                    owner.id,
                    created.listing.id,
                    ListingPatch {
                        title: Some("  ".to_string()),
                        ..Default::default()
                    }
                )
                .await,
            Err(MarketError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_listing_is_not_found() {
        let (store, service, owner) = setup().await;
        let kept = service.create(owner.id, payload("kept")).await.unwrap();

        assert!(matches!(
            service.delete(owner.id, Uuid::new_v4()).await,
            Err(MarketError::NotFound(_))
        ));
        assert_eq!(
            store.list_listings(ListingFilter::All).await.unwrap(),
            vec![kept.clone()]
        );

        service.delete(owner.id, kept.listing.id).await.unwrap();
        assert!(store.list_listings(ListingFilter::All).await.unwrap().is_empty());
    }
}
