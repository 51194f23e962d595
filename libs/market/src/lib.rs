//! Marketplace domain library
//!
//! Accounts, listings and feature requests, the store they are persisted
//! in and the operations the HTTP services expose. Every operation goes
//! through a [`store::MarketStore`], so the services can run against
//! PostgreSQL ([`store::PgStore`]) while tests use [`store::MemoryStore`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use market::models::NewListing;
//! use market::operations::ListingService;
//! use market::store::PgStore;
//!
//! async fn publish(pool: sqlx::PgPool, owner: uuid::Uuid) -> anyhow::Result<()> {
//!     let listings = ListingService::new(Arc::new(PgStore::new(pool)));
//!     let created = listings
//!         .create(
//!             owner,
//!             NewListing {
//!                 title: Some("Bright studio".to_string()),
//!                 description: Some("Close to the station".to_string()),
//!                 price: Some(120.0),
//!                 city: Some("Lisbon".to_string()),
//!                 neighborhood: None,
//!                 images: Some(vec!["studio.jpg".to_string()]),
//!             },
//!         )
//!         .await?;
//!     println!("Created listing {}", created.listing.id);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod operations;
pub mod password;
pub mod store;
pub mod validation;
