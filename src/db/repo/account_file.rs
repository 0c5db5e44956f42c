use crate::db::DbResult;
use crate::db::error::DbError;
use crate::db::repo::account::AccountRepo;
use crate::models::account::Account;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Accounts as `<dir>/<username>.json`, used next to the file-backed item
/// stores. Usernames are validated before they reach this store, so they are
/// always safe file names.
pub struct AccountFileStore {
    dir: PathBuf,
}

impl AccountFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{username}.json"))
    }
}

#[async_trait::async_trait]
impl AccountRepo for AccountFileStore {
    async fn get_by_username(&self, username: &str) -> DbResult<Option<Account>> {
        let path = self.path_for(username);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DbError::unavailable(path, e)),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// The record is written to a private temp file first and then hard linked
    /// into place. Linking fails if the name exists, which makes the uniqueness
    /// check atomic, and readers never observe a half written file.
    async fn insert_account(&self, account: Account) -> DbResult<Account> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DbError::unavailable(&self.dir, e))?;

        let body = serde_json::to_vec_pretty(&account)?;
        let tmp = self.dir.join(format!(".{}.{}.tmp", account.username, account.id));
        fs::write(&tmp, &body).await.map_err(|e| DbError::unavailable(&tmp, e))?;

        let linked = fs::hard_link(&tmp, self.path_for(&account.username)).await;
        if let Err(e) = fs::remove_file(&tmp).await {
            tracing::warn!(path = %tmp.display(), error = %e, "failed to remove temp account file");
        }

        match linked {
            Ok(()) => Ok(account),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(DbError::UniqueViolation),
            Err(e) => Err(DbError::unavailable(&self.dir, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::AccountId;
    use tempfile::TempDir;

    fn account(username: &str) -> Account {
        Account {
            id: AccountId::new(),
            username: username.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_then_read_back() {
        let tmp = TempDir::new().unwrap();
        let store = AccountFileStore::new(tmp.path().join("accounts"));

        assert!(store.get_by_username("hero").await.unwrap().is_none());

        let created = store.insert_account(account("hero")).await.unwrap();
        let loaded = store.get_by_username("hero").await.unwrap().unwrap();
        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.password_hash, "$argon2id$fake");
    }

    #[tokio::test]
    async fn second_insert_is_a_unique_violation() {
        let tmp = TempDir::new().unwrap();
        let store = AccountFileStore::new(tmp.path());

        store.insert_account(account("hero")).await.unwrap();
        let err = store.insert_account(account("hero")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation));

        // no temp files left behind
        let leftovers = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
