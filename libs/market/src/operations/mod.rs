//! Marketplace operations, one service per resource

pub mod accounts;
pub mod feature_requests;
pub mod listings;
pub mod moderation;

pub use accounts::{AccountService, INVALID_CREDENTIALS};
pub use feature_requests::FeatureRequestService;
pub use listings::ListingService;
pub use moderation::ModerationService;
