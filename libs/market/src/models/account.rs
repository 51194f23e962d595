//! Account model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored account row, including the password hash
///
/// Never serialized; convert with [`AccountRecord::public`] before
/// returning it to a client.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRecord {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub banned: bool,
    pub created_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn public(&self) -> Account {
        Account {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            banned: self.banned,
            created_at: self.created_at,
        }
    }
}

/// Public account fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub banned: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Owner summary embedded in listing responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

/// Account annotated with the number of listings it owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountWithListingCount {
    #[serde(flatten)]
    pub account: Account,
    pub listing_count: i64,
}

/// Registration payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginCredentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Moderation payload for the banned flag
///
/// Kept as a raw JSON value so that a non-boolean is reported as invalid
/// input rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BanUpdate {
    pub banned: Option<serde_json::Value>,
}
