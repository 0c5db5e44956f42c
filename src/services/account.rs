use crate::db::error::DbError;
use crate::db::repo::AccountRepo;
use crate::error::{AppResult, DomainError};
use crate::models::account::Account;
use crate::models::types::AccountId;
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHasher, SaltString};
use std::sync::Arc;

pub struct AccountService {
    repo: Arc<dyn AccountRepo>,
    argon: Argon2<'static>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn AccountRepo>) -> Self {
        let argon = Argon2::default();
        Self { repo, argon }
    }

    pub async fn exists(&self, username: &str) -> AppResult<bool> {
        Ok(self.repo.get_by_username(username).await?.is_some())
    }

    /// Creates a new account. The existence check gives a friendly early answer;
    /// the store's own uniqueness guarantee decides concurrent races.
    pub async fn register(&self, username: &str, password: &str) -> AppResult<Account> {
        Account::validate_username(username)?;
        Account::validate_password(password)?;

        if self.exists(username).await? {
            return Err(DomainError::Conflict(format!("username {username} is already taken")));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon
            .hash_password(password.as_bytes(), &salt)
            .map_err(DomainError::Password)?
            .to_string();

        let account = Account {
            id: AccountId::new(),
            username: username.to_string(),
            password_hash: hash,
            created_at: chrono::Utc::now(),
        };

        match self.repo.insert_account(account).await {
            Ok(account) => {
                tracing::info!(
                    username = %account.username,
                    account_id = %account.id,
                    "account created"
                );
                Ok(account)
            }
            Err(DbError::UniqueViolation) => Err(DomainError::Conflict(format!(
                "username {username} is already taken"
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::AccountFileStore;

    #[tokio::test]
    async fn registration_stores_an_argon2_hash() {
        use password_hash::{PasswordHash, PasswordVerifier};

        let tmp = tempfile::TempDir::new().unwrap();
        let svc = AccountService::new(Arc::new(AccountFileStore::new(tmp.path())));

        let account = svc.register("gandalf", "mellon").await.unwrap();
        assert!(account.password_hash.starts_with("$argon2"));
        assert!(svc.exists("gandalf").await.unwrap());

        let parsed = PasswordHash::new(&account.password_hash).unwrap();
        assert!(Argon2::default().verify_password(b"mellon", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"friend", &parsed).is_err());

        assert!(matches!(
            svc.register("gandalf", "another1").await,
            Err(DomainError::Conflict(_))
        ));
    }
}
