//! Marketplace operations against a live PostgreSQL database
//!
//! Requires `DATABASE_URL`; run with `cargo test -- --ignored`.

use std::sync::Arc;

use common::database::{DatabaseConfig, init_pool, run_migrations};
use market::error::MarketError;
use market::models::{
    FeatureDecision, FeatureStatus, ListingFilter, ListingPatch, NewFeatureRequest, NewListing,
    RegisterRequest,
};
use market::operations::{AccountService, FeatureRequestService, ListingService};
use market::store::{MarketStore, PgStore};
use uuid::Uuid;

async fn store() -> anyhow::Result<Arc<PgStore>> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;
    run_migrations(&pool).await?;
    Ok(Arc::new(PgStore::new(pool)))
}

fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4().simple())
}

fn new_listing(title: &str) -> NewListing {
    NewListing {
        title: Some(title.to_string()),
        description: Some("D".to_string()),
        price: Some(100.0),
        city: Some("C".to_string()),
        neighborhood: Some("Old town".to_string()),
        images: Some(vec!["a.jpg".to_string(), "b.jpg".to_string()]),
    }
}

#[tokio::test]
#[ignore]
async fn test_account_email_is_unique() -> anyhow::Result<()> {
    let store = store().await?;
    let accounts = AccountService::new(store.clone());
    let email = unique_email();

    let request = RegisterRequest {
        name: None,
        email: Some(email.clone()),
        password: Some("secret".to_string()),
    };
    accounts.register(request.clone()).await?;

    let second = accounts.register(request).await;
    assert!(matches!(second, Err(MarketError::Conflict(_))));

    let record = store.find_account_by_email(&email).await?;
    assert!(record.is_some_and(|r| r.password_hash.starts_with("$argon2")));
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_listing_lifecycle_and_feature_workflow() -> anyhow::Result<()> {
    let store = store().await?;
    let accounts = AccountService::new(store.clone());
    let listings = ListingService::new(store.clone());
    let features = FeatureRequestService::new(store.clone());

    let owner = accounts
        .register(RegisterRequest {
            name: Some("Owner".to_string()),
            email: Some(unique_email()),
            password: Some("secret".to_string()),
        })
        .await?;

    let created = listings.create(owner.id, new_listing("T")).await?;
    assert_eq!(created.listing.images, vec!["a.jpg", "b.jpg"]);
    assert_eq!(created.listing.rating, 0);

    let patch: ListingPatch = serde_json::from_value(serde_json::json!({ "neighborhood": null }))?;
    let updated = listings.update(owner.id, created.listing.id, patch).await?;
    assert_eq!(updated.listing.neighborhood, None);
    assert_eq!(updated.listing.title, "T");

    let request = features
        .request(
            owner.id,
            NewFeatureRequest {
                listing_id: Some(created.listing.id),
            },
        )
        .await?;
    let duplicate = features
        .request(
            owner.id,
            NewFeatureRequest {
                listing_id: Some(created.listing.id),
            },
        )
        .await;
    assert!(matches!(duplicate, Err(MarketError::Conflict(_))));

    let approved = features
        .decide(
            request.request.id,
            FeatureDecision {
                status: Some("approved".to_string()),
            },
        )
        .await?;
    assert_eq!(approved.request.status, FeatureStatus::Approved);
    assert!(listings.get(created.listing.id).await?.listing.featured);

    let mine = listings.list(ListingFilter::Owner(owner.id)).await?;
    assert_eq!(mine.len(), 1);

    listings.delete(owner.id, created.listing.id).await?;
    assert!(store.find_feature_request(request.request.id).await?.is_none());
    assert!(matches!(
        listings.get(created.listing.id).await,
        Err(MarketError::NotFound(_))
    ));
    Ok(())
}
