//! PostgreSQL implementation of the marketplace store

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::MarketStore;
use crate::error::{StoreError, StoreResult};
use crate::models::listing::{decode_images, encode_images};
use crate::models::{
    Account, AccountRecord, AccountSummary, AccountWithListingCount, FeatureRequest,
    FeatureRequestView, FeatureStatus, Listing, ListingChanges, ListingDraft, ListingFilter,
    ListingWithOwner,
};

const LISTING_COLUMNS: &str = r#"
    l.id, l.owner_id, l.title, l.description, l.price, l.city, l.neighborhood,
    l.images, l.rating, l.featured, l.active, l.created_at,
    a.name AS owner_name, a.email AS owner_email
"#;

const FEATURE_REQUEST_COLUMNS: &str = r#"
    f.id AS request_id, f.account_id AS request_account_id,
    f.status AS request_status, f.created_at AS request_created_at
"#;

/// Marketplace store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an initialized pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> StoreResult<Account> {
    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        banned: row.try_get("banned")?,
        created_at: row.try_get("created_at")?,
    })
}

fn listing_with_owner_from_row(row: &PgRow) -> StoreResult<ListingWithOwner> {
    let images: String = row.try_get("images")?;
    let owner_id: Uuid = row.try_get("owner_id")?;

    Ok(ListingWithOwner {
        listing: Listing {
            id: row.try_get("id")?,
            owner_id,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            city: row.try_get("city")?,
            neighborhood: row.try_get("neighborhood")?,
            images: decode_images(&images)?,
            rating: row.try_get("rating")?,
            featured: row.try_get("featured")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
        },
        owner: AccountSummary {
            id: owner_id,
            name: row.try_get("owner_name")?,
            email: row.try_get("owner_email")?,
        },
    })
}

fn parse_status(raw: &str) -> StoreResult<FeatureStatus> {
    raw.parse().map_err(StoreError::Corrupt)
}

fn feature_request_from_row(row: &PgRow) -> StoreResult<FeatureRequest> {
    let status: String = row.try_get("status")?;
    Ok(FeatureRequest {
        id: row.try_get("id")?,
        listing_id: row.try_get("listing_id")?,
        account_id: row.try_get("account_id")?,
        status: parse_status(&status)?,
        created_at: row.try_get("created_at")?,
    })
}

fn feature_request_view_from_row(row: &PgRow) -> StoreResult<FeatureRequestView> {
    let listing = listing_with_owner_from_row(row)?;
    let status: String = row.try_get("request_status")?;

    Ok(FeatureRequestView {
        request: FeatureRequest {
            id: row.try_get("request_id")?,
            listing_id: listing.listing.id,
            account_id: row.try_get("request_account_id")?,
            status: parse_status(&status)?,
            created_at: row.try_get("request_created_at")?,
        },
        listing,
    })
}

#[async_trait]
impl MarketStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_account(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> StoreResult<Account> {
        info!("Inserting account: {}", email);

        let row = sqlx::query(
            r#"
            INSERT INTO accounts (id, email, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, banned, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        account_from_row(&row)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AccountRecord>> {
        let record = sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT id, email, name, password_hash, banned, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, banned, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn list_accounts_with_counts(&self) -> StoreResult<Vec<AccountWithListingCount>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.email, a.name, a.banned, a.created_at,
                   COUNT(l.id) AS listing_count
            FROM accounts a
            LEFT JOIN listings l ON l.owner_id = a.id
            GROUP BY a.id
            ORDER BY a.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(AccountWithListingCount {
                    account: account_from_row(row)?,
                    listing_count: row.try_get("listing_count")?,
                })
            })
            .collect()
    }

    async fn set_account_banned(&self, id: Uuid, banned: bool) -> StoreResult<Option<Account>> {
        let row = sqlx::query(
            r#"
            UPDATE accounts SET banned = $2
            WHERE id = $1
            RETURNING id, email, name, banned, created_at
            "#,
        )
        .bind(id)
        .bind(banned)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn insert_listing(&self, owner_id: Uuid, draft: &ListingDraft) -> StoreResult<Listing> {
        let row = sqlx::query(
            r#"
            INSERT INTO listings (id, owner_id, title, description, price, city, neighborhood, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, owner_id, title, description, price, city, neighborhood,
                      images, rating, featured, active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.city)
        .bind(&draft.neighborhood)
        .bind(encode_images(&draft.images))
        .fetch_one(&self.pool)
        .await?;

        let images: String = row.try_get("images")?;
        Ok(Listing {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            city: row.try_get("city")?,
            neighborhood: row.try_get("neighborhood")?,
            images: decode_images(&images)?,
            rating: row.try_get("rating")?,
            featured: row.try_get("featured")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn find_listing(&self, id: Uuid) -> StoreResult<Option<ListingWithOwner>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings l JOIN accounts a ON a.id = l.owner_id WHERE l.id = $1"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(listing_with_owner_from_row).transpose()
    }

    async fn list_listings(&self, filter: ListingFilter) -> StoreResult<Vec<ListingWithOwner>> {
        let base = format!("SELECT {LISTING_COLUMNS} FROM listings l JOIN accounts a ON a.id = l.owner_id");

        let rows = match filter {
            ListingFilter::Public => {
                let sql = format!(
                    "{base} WHERE l.active = TRUE ORDER BY l.featured DESC, l.created_at DESC"
                );
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
            ListingFilter::Owner(owner_id) => {
                let sql = format!("{base} WHERE l.owner_id = $1 ORDER BY l.created_at DESC");
                sqlx::query(&sql)
                    .bind(owner_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            ListingFilter::All => {
                let sql = format!("{base} ORDER BY l.created_at DESC");
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };

        rows.iter().map(listing_with_owner_from_row).collect()
    }

    async fn update_listing(
        &self,
        id: Uuid,
        changes: &ListingChanges,
    ) -> StoreResult<Option<ListingWithOwner>> {
        let sql = format!(
            r#"
            WITH l AS (
                UPDATE listings SET
                    title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    price = COALESCE($4, price),
                    city = COALESCE($5, city),
                    neighborhood = CASE WHEN $6 THEN $7 ELSE neighborhood END,
                    images = COALESCE($8, images),
                    rating = COALESCE($9, rating),
                    featured = COALESCE($10, featured),
                    active = COALESCE($11, active)
                WHERE id = $1
                RETURNING *
            )
            SELECT {LISTING_COLUMNS} FROM l JOIN accounts a ON a.id = l.owner_id
            "#
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.price)
            .bind(&changes.city)
            .bind(changes.neighborhood.is_some())
            .bind(changes.neighborhood.clone().flatten())
            .bind(changes.images.as_deref().map(encode_images))
            .bind(changes.rating)
            .bind(changes.featured)
            .bind(changes.active)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(listing_with_owner_from_row).transpose()
    }

    async fn delete_listing(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let requests = sqlx::query("DELETE FROM feature_requests WHERE listing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if result.rows_affected() > 0 {
            info!(
                "Deleted listing {} and {} feature requests",
                id,
                requests.rows_affected()
            );
        }

        Ok(result.rows_affected() > 0)
    }

    async fn find_pending_feature_request(
        &self,
        listing_id: Uuid,
    ) -> StoreResult<Option<FeatureRequest>> {
        let row = sqlx::query(
            r#"
            SELECT id, listing_id, account_id, status, created_at
            FROM feature_requests
            WHERE listing_id = $1 AND status = 'pending'
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(feature_request_from_row).transpose()
    }

    async fn insert_feature_request(
        &self,
        listing_id: Uuid,
        account_id: Uuid,
    ) -> StoreResult<FeatureRequest> {
        let row = sqlx::query(
            r#"
            INSERT INTO feature_requests (id, listing_id, account_id, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, listing_id, account_id, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        feature_request_from_row(&row)
    }

    async fn find_feature_request(&self, id: Uuid) -> StoreResult<Option<FeatureRequestView>> {
        let sql = format!(
            r#"
            SELECT {FEATURE_REQUEST_COLUMNS}, {LISTING_COLUMNS}
            FROM feature_requests f
            JOIN listings l ON l.id = f.listing_id
            JOIN accounts a ON a.id = l.owner_id
            WHERE f.id = $1
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(feature_request_view_from_row).transpose()
    }

    async fn list_feature_requests(&self) -> StoreResult<Vec<FeatureRequestView>> {
        let sql = format!(
            r#"
            SELECT {FEATURE_REQUEST_COLUMNS}, {LISTING_COLUMNS}
            FROM feature_requests f
            JOIN listings l ON l.id = f.listing_id
            JOIN accounts a ON a.id = l.owner_id
            ORDER BY f.created_at DESC
            "#
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(feature_request_view_from_row).collect()
    }

    async fn decide_feature_request(
        &self,
        id: Uuid,
        status: FeatureStatus,
    ) -> StoreResult<Option<FeatureRequest>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE feature_requests SET status = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING id, listing_id, account_id, status, created_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let request = feature_request_from_row(&row)?;

        if status == FeatureStatus::Approved {
            sqlx::query("UPDATE listings SET featured = TRUE WHERE id = $1")
                .bind(request.listing_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(request))
    }
}
