//! Service settings read from `AUTH_*` environment variables

use anyhow::Result;
use ::config::{Config, Environment};
use serde::Deserialize;

/// Authentication service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Address the HTTP server binds to (`AUTH_BIND_ADDRESS`)
    pub bind_address: String,
    /// Comma separated emails granted the admin role at login
    /// (`AUTH_ADMIN_EMAILS`)
    pub admin_emails: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let settings = Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("admin_emails", "")?
            .add_source(Environment::with_prefix("AUTH"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Admin emails, trimmed but otherwise kept exactly as configured
    pub fn admin_emails(&self) -> Vec<String> {
        self.admin_emails
            .split(',')
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect()
    }
}
