//! Service settings read from `API_*` environment variables

use ::config::{Config, Environment};
use anyhow::Result;
use serde::Deserialize;

/// API service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Address the HTTP server binds to (`API_BIND_ADDRESS`)
    pub bind_address: String,
    /// Apply the embedded migrations at start-up (`API_RUN_MIGRATIONS`)
    pub run_migrations: bool,
    /// Largest request body accepted by listing create and update
    /// (`API_MAX_BODY_BYTES`); images travel inline as data URLs
    pub max_body_bytes: usize,
}

/// 20 MiB, enough for a handful of inline photos
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

impl Settings {
    pub fn from_env() -> Result<Self> {
        let settings = Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .set_default("run_migrations", true)?
            .set_default("max_body_bytes", DEFAULT_MAX_BODY_BYTES as i64)?
            .add_source(Environment::with_prefix("API"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_settings_defaults() {
        unsafe {
            std::env::remove_var("API_BIND_ADDRESS");
            std::env::remove_var("API_RUN_MIGRATIONS");
            std::env::remove_var("API_MAX_BODY_BYTES");
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.bind_address, "0.0.0.0:3001");
        assert!(settings.run_migrations);
        assert_eq!(settings.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    #[serial]
    fn test_settings_from_env() {
        unsafe {
            std::env::set_var("API_BIND_ADDRESS", "127.0.0.1:8080");
            std::env::set_var("API_RUN_MIGRATIONS", "false");
            std::env::set_var("API_MAX_BODY_BYTES", "1048576");
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.bind_address, "127.0.0.1:8080");
        assert!(!settings.run_migrations);
        assert_eq!(settings.max_body_bytes, 1048576);

        unsafe {
            std::env::remove_var("API_BIND_ADDRESS");
            std::env::remove_var("API_RUN_MIGRATIONS");
            std::env::remove_var("API_MAX_BODY_BYTES");
        }
    }
}
