//! Application state shared across handlers

use std::sync::Arc;

use common::{cache::Cache, jwt::JwtService};
use market::{operations::AccountService, store::MarketStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MarketStore>,
    pub accounts: AccountService,
    pub jwt_service: JwtService,
    pub cache: Arc<dyn Cache>,
    pub admin_emails: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MarketStore>,
        jwt_service: JwtService,
        cache: Arc<dyn Cache>,
        admin_emails: Vec<String>,
    ) -> Self {
        Self {
            accounts: AccountService::new(store.clone()),
            store,
            jwt_service,
            cache,
            admin_emails: Arc::new(admin_emails),
        }
    }

    /// Roles carried by an account's access tokens
    ///
    /// Account emails are unique case-sensitively, so the admin list is
    /// matched the same way.
    pub fn roles_for(&self, email: &str) -> Vec<String> {
        if self.admin_emails.iter().any(|admin| admin == email) {
            vec![common::jwt::ADMIN_ROLE.to_string()]
        } else {
            Vec::new()
        }
    }
}
