//! Feature request model
//!
//! A feature request asks a moderator to promote a listing. It starts
//! `pending` and moves once to `approved` or `denied`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ListingWithOwner;

/// Feature request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStatus {
    Pending,
    Approved,
    Denied,
}

impl FeatureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureStatus::Pending => "pending",
            FeatureStatus::Approved => "approved",
            FeatureStatus::Denied => "denied",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, FeatureStatus::Pending)
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FeatureStatus::Pending),
            "approved" => Ok(FeatureStatus::Approved),
            "denied" => Ok(FeatureStatus::Denied),
            other => Err(format!("Invalid status: {}", other)),
        }
    }
}

/// Feature request entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequest {
    pub id: Uuid,
    pub listing_id: Uuid,
    /// Owner of the listing at request time
    pub account_id: Uuid,
    pub status: FeatureStatus,
    pub created_at: DateTime<Utc>,
}

/// Feature request joined with its listing and the listing owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequestView {
    #[serde(flatten)]
    pub request: FeatureRequest,
    pub listing: ListingWithOwner,
}

/// Payload for requesting promotion of a listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFeatureRequest {
    pub listing_id: Option<Uuid>,
}

/// Moderator decision payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureDecision {
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("approved".parse::<FeatureStatus>(), Ok(FeatureStatus::Approved));
        assert_eq!("denied".parse::<FeatureStatus>(), Ok(FeatureStatus::Denied));
        assert_eq!("pending".parse::<FeatureStatus>(), Ok(FeatureStatus::Pending));
        assert!("APPROVED".parse::<FeatureStatus>().is_err());
        assert!("aprovado".parse::<FeatureStatus>().is_err());
    }

    #[test]
    fn test_only_pending_is_open() {
        assert!(!FeatureStatus::Pending.is_terminal());
        assert!(FeatureStatus::Approved.is_terminal());
        assert!(FeatureStatus::Denied.is_terminal());
        assert_eq!(
            serde_json::to_string(&FeatureStatus::Denied).unwrap(),
            "\"denied\""
        );
    }
}
