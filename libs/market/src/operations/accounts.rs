//! Account registration and authentication

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{MarketError, MarketResult, StoreError};
use crate::models::{Account, LoginCredentials, RegisterRequest};
use crate::password::{hash_password, verify_password};
use crate::store::MarketStore;
use crate::validation::{optional, required, validate_email, validate_password};

/// Message shared by every credential failure, so a caller cannot tell an
/// unknown email from a wrong password
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

const CREDENTIALS_REQUIRED: &str = "Email and password are required";
const EMAIL_TAKEN: &str = "This email is already in use";

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn MarketStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Register a new account
    pub async fn register(&self, request: RegisterRequest) -> MarketResult<Account> {
        let email = required(request.email, CREDENTIALS_REQUIRED)?;
        let password = request
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| MarketError::invalid(CREDENTIALS_REQUIRED))?;
        validate_email(&email)?;
        validate_password(&password)?;

        if self.store.find_account_by_email(&email).await?.is_some() {
            return Err(MarketError::conflict(EMAIL_TAKEN));
        }

        let password_hash = hash_password(&password)?;
        let name = optional(request.name);

        let account = match self
            .store
            .insert_account(&email, name.as_deref(), &password_hash)
            .await
        {
            Ok(account) => account,
            Err(StoreError::Conflict(_)) => return Err(MarketError::conflict(EMAIL_TAKEN)),
            Err(e) => return Err(e.into()),
        };

        info!("Registered account {}", account.id);
        Ok(account)
    }

    /// Check credentials and return the public account
    ///
    /// The banned flag is checked before the password.
    pub async fn authenticate(&self, credentials: LoginCredentials) -> MarketResult<Account> {
        let (Some(email), Some(password)) = (credentials.email, credentials.password) else {
            return Err(MarketError::invalid(CREDENTIALS_REQUIRED));
        };
        if email.trim().is_empty() || password.is_empty() {
            return Err(MarketError::invalid(CREDENTIALS_REQUIRED));
        }

        let Some(record) = self.store.find_account_by_email(email.trim()).await? else {
            return Err(MarketError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if record.banned {
            warn!("Login refused for banned account {}", record.id);
            return Err(MarketError::forbidden("Account banned"));
        }

        if !verify_password(&password, &record.password_hash)? {
            return Err(MarketError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(record.public())
    }

    /// Load an account that is allowed to act: it must exist and not be
    /// banned
    pub async fn active_account(&self, id: Uuid) -> MarketResult<Account> {
        active_account(self.store.as_ref(), id).await
    }
}

pub(crate) async fn active_account(store: &dyn MarketStore, id: Uuid) -> MarketResult<Account> {
    let account = store
        .find_account(id)
        .await?
        .ok_or_else(|| MarketError::not_found("Account not found"))?;

    if account.banned {
        return Err(MarketError::forbidden("Account banned"));
    }

    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some("Bella".to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn login(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_returns_public_fields() {
        let service = AccountService::new(Arc::new(MemoryStore::new()));

        let account = service
            .register(register_request("bella@example.com", "s3cret"))
            .await
            .unwrap();

        assert_eq!(account.email, "bella@example.com");
        assert_eq!(account.name.as_deref(), Some("Bella"));
        assert!(!account.banned);

        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_requires_email_and_password() {
        let service = AccountService::new(Arc::new(MemoryStore::new()));

        let missing_password = RegisterRequest {
            email: Some("a@example.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.register(missing_password).await,
            Err(MarketError::InvalidInput(_))
        ));

        let missing_email = RegisterRequest {
            password: Some("pw".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.register(missing_email).await,
            Err(MarketError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_without_new_row() {
        let store = MemoryStore::new();
        let service = AccountService::new(Arc::new(store.clone()));

        service
            .register(register_request("dup@example.com", "first"))
            .await
            .unwrap();
        let second = service
            .register(register_request("dup@example.com", "second"))
            .await;

        assert!(matches!(second, Err(MarketError::Conflict(_))));
        assert_eq!(store.account_count().await, 1);
    }

    #[tokio::test]
    async fn test_login_failures_share_one_message() {
        let service = AccountService::new(Arc::new(MemoryStore::new()));
        service
            .register(register_request("user@example.com", "right"))
            .await
            .unwrap();

        let unknown = service.authenticate(login("nobody@example.com", "right")).await;
        let wrong = service.authenticate(login("user@example.com", "wrong")).await;

        match (unknown, wrong) {
            (Err(MarketError::Unauthorized(a)), Err(MarketError::Unauthorized(b))) => {
                assert_eq!(a, b);
                assert_eq!(a, INVALID_CREDENTIALS);
            }
            other => panic!("unexpected results: {:?}", other),
        }

        let ok = service
            .authenticate(login("user@example.com", "right"))
            .await
            .unwrap();
        assert_eq!(ok.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_banned_login_is_forbidden_regardless_of_password() {
        let store = Arc::new(MemoryStore::new());
        let service = AccountService::new(store.clone());
        let account = service
            .register(register_request("banned@example.com", "right"))
            .await
            .unwrap();
        store.set_account_banned(account.id, true).await.unwrap();

        for password in ["right", "wrong"] {
            let result = service
                .authenticate(login("banned@example.com", password))
                .await;
            assert!(matches!(result, Err(MarketError::Forbidden(_))));
        }
    }

    #[tokio::test]
    async fn test_active_account_checks() {
        let store = Arc::new(MemoryStore::new());
        let service = AccountService::new(store.clone());

        assert!(matches!(
            service.active_account(Uuid::new_v4()).await,
            Err(MarketError::NotFound(_))
        ));

        let account = service
            .register(register_request("x@example.com", "pw"))
            .await
            .unwrap();
        assert!(service.active_account(account.id).await.is_ok());

        store.set_account_banned(account.id, true).await.unwrap();
        assert!(matches!(
            service.active_account(account.id).await,
            Err(MarketError::Forbidden(_))
        ));
    }
}
