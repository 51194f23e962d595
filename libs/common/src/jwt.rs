//! JWT service for token generation, validation, and revocation
//!
//! Tokens are signed with HS256 when a shared secret is configured, or with
//! RS256 from a PEM key pair. Revoked tokens are kept in a [`Cache`] until
//! they would have expired anyway.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::Cache;

/// Role granted to moderators
pub const ADMIN_ROLE: &str = "admin";

/// Signing material
#[derive(Debug, Clone)]
pub enum JwtKeys {
    /// Shared secret for HS256
    Secret(String),
    /// PEM keys for RS256; the private key is only needed by the issuer
    Rsa {
        private_key: Option<String>,
        public_key: String,
    },
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub keys: JwtKeys,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Shared HS256 secret; takes precedence over RSA keys
    /// - `JWT_PRIVATE_KEY`: Private key (PEM format) or path to the key file
    /// - `JWT_PUBLIC_KEY`: Public key (PEM format) or path to the key file
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let keys = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => JwtKeys::Secret(secret),
            _ => {
                let public_key = std::env::var("JWT_PUBLIC_KEY").map_err(|_| {
                    anyhow::anyhow!("Neither JWT_SECRET nor JWT_PUBLIC_KEY environment variable is set")
                })?;
                let private_key = match std::env::var("JWT_PRIVATE_KEY") {
                    Ok(value) => Some(read_pem(&value)?),
                    Err(_) => None,
                };
                JwtKeys::Rsa {
                    private_key,
                    public_key: read_pem(&public_key)?,
                }
            }
        };

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);

        Ok(JwtConfig {
            keys,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// Accept either inline PEM text or a path to a PEM file
fn read_pem(value: &str) -> Result<String> {
    if value.starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    let content = std::fs::read_to_string(value)
        .map_err(|e| anyhow::anyhow!("Failed to read key file {}: {}", value, e))?;
    Ok(content.trim().to_string())
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: Uuid,
    /// Account roles
    pub roles: Vec<String>,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Unique token id, so two tokens issued in the same second differ
    pub jti: Uuid,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == ADMIN_ROLE)
    }
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    algorithm: Algorithm,
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let (algorithm, encoding_key, decoding_key) = match &config.keys {
            JwtKeys::Secret(secret) => (
                Algorithm::HS256,
                Some(EncodingKey::from_secret(secret.as_bytes())),
                DecodingKey::from_secret(secret.as_bytes()),
            ),
            JwtKeys::Rsa {
                private_key,
                public_key,
            } => (
                Algorithm::RS256,
                private_key
                    .as_ref()
                    .map(|key| EncodingKey::from_rsa_pem(key.as_bytes()))
                    .transpose()?,
                DecodingKey::from_rsa_pem(public_key.as_bytes())?,
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;

        Ok(JwtService {
            algorithm,
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    fn issue(&self, account_id: Uuid, roles: &[String], token_type: TokenType) -> Result<String> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No signing key configured"))?;

        let now = now_secs()?;
        let expiry = match token_type {
            TokenType::Access => self.config.access_token_expiry,
            TokenType::Refresh => self.config.refresh_token_expiry,
        };

        let claims = Claims {
            sub: account_id,
            roles: roles.to_vec(),
            iat: now,
            exp: now + expiry,
            jti: Uuid::new_v4(),
            token_type,
        };

        let token = encode(&Header::new(self.algorithm), &claims, encoding_key)?;
        Ok(token)
    }

    /// Generate an access token for an account
    pub fn generate_access_token(&self, account_id: Uuid, roles: &[String]) -> Result<String> {
        self.issue(account_id, roles, TokenType::Access)
    }

    /// Generate a refresh token for an account
    pub fn generate_refresh_token(&self, account_id: Uuid) -> Result<String> {
        self.issue(account_id, &[], TokenType::Refresh)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Check if a token has been revoked
    pub async fn is_token_blacklisted(&self, cache: &dyn Cache, token: &str) -> Result<bool> {
        let key = format!("blacklisted_token:{}", token);
        let result = cache.get(&key).await?;
        Ok(result.is_some())
    }

    /// Revoke a token until validation would reject it anyway
    ///
    /// Validation accepts a token for `leeway` seconds past its `exp`, so
    /// the denylist entry lives that much longer too.
    pub async fn blacklist_token(&self, cache: &dyn Cache, token: &str, exp: u64) -> Result<()> {
        let remaining = (exp + self.validation.leeway).saturating_sub(now_secs()?);
        if remaining == 0 {
            return Ok(());
        }

        let key = format!("blacklisted_token:{}", token);
        cache.set(&key, "1", Some(remaining)).await?;
        Ok(())
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Rotate a refresh token
    ///
    /// Revokes the old refresh token and issues a new one for the same
    /// account.
    pub async fn rotate_refresh_token(
        &self,
        cache: &dyn Cache,
        account_id: Uuid,
        old_refresh_token: &str,
    ) -> Result<String> {
        let claims = self.validate_token(old_refresh_token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(anyhow::anyhow!("Token is not a refresh token"));
        }

        if claims.sub != account_id {
            return Err(anyhow::anyhow!("Token does not belong to account"));
        }

        self.blacklist_token(cache, old_refresh_token, claims.exp)
            .await?;

        self.generate_refresh_token(account_id)
    }
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            keys: JwtKeys::Secret("test-secret".to_string()),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        })
        .unwrap()
    }

    #[test]
    fn test_access_token_round_trip_keeps_roles() {
        let jwt = service();
        let account_id = Uuid::new_v4();

        let token = jwt
            .generate_access_token(account_id, &[ADMIN_ROLE.to_string()])
            .unwrap();
        let claims = jwt.validate_token(&token).unwrap();

        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new(JwtConfig {
            keys: JwtKeys::Secret("another-secret".to_string()),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        })
        .unwrap();

        let token = other.generate_access_token(Uuid::new_v4(), &[]).unwrap();
        assert!(service().validate_token(&token).is_err());
    }

    #[tokio::test]
    async fn test_rotate_refresh_token_revokes_old_token() {
        let jwt = service();
        let cache = MemoryCache::new();
        let account_id = Uuid::new_v4();

        let old = jwt.generate_refresh_token(account_id).unwrap();
        let new = jwt
            .rotate_refresh_token(&cache, account_id, &old)
            .await
            .unwrap();

        assert_ne!(old, new);
        assert!(jwt.is_token_blacklisted(&cache, &old).await.unwrap());
        assert!(!jwt.is_token_blacklisted(&cache, &new).await.unwrap());
    }

    #[tokio::test]
    async fn test_rotate_rejects_access_token_and_foreign_account() {
        let jwt = service();
        let cache = MemoryCache::new();
        let account_id = Uuid::new_v4();

        let access = jwt.generate_access_token(account_id, &[]).unwrap();
        assert!(
            jwt.rotate_refresh_token(&cache, account_id, &access)
                .await
                .is_err()
        );

        let refresh = jwt.generate_refresh_token(account_id).unwrap();
        assert!(
            jwt.rotate_refresh_token(&cache, Uuid::new_v4(), &refresh)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_token_past_exp_but_within_leeway_can_be_revoked() {
        let jwt = JwtService::new(JwtConfig {
            keys: JwtKeys::Secret("test-secret".to_string()),
            access_token_expiry: 0,
            refresh_token_expiry: 0,
        })
        .unwrap();
        let cache = MemoryCache::new();

        let token = jwt.generate_access_token(Uuid::new_v4(), &[]).unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert!(claims.exp <= now_secs().unwrap());

        jwt.blacklist_token(&cache, &token, claims.exp).await.unwrap();
        assert!(jwt.is_token_blacklisted(&cache, &token).await.unwrap());

        let refresh = jwt.generate_refresh_token(claims.sub).unwrap();
        jwt.rotate_refresh_token(&cache, claims.sub, &refresh)
            .await
            .unwrap();
        assert!(jwt.is_token_blacklisted(&cache, &refresh).await.unwrap());
    }

    #[tokio::test]
    async fn test_token_past_leeway_is_not_stored() {
        let jwt = service();
        let cache = MemoryCache::new();
        let stale = now_secs().unwrap() - 120;

        jwt.blacklist_token(&cache, "stale-token", stale).await.unwrap();
        assert!(!jwt.is_token_blacklisted(&cache, "stale-token").await.unwrap());
    }

    #[test]
    fn test_public_key_only_service_cannot_issue() {
        let jwt = JwtService {
            encoding_key: None,
            ..service()
        };
        assert!(jwt.generate_access_token(Uuid::new_v4(), &[]).is_err());
    }
}
