use crate::db::DbResult;
use crate::models::account::Account;

#[async_trait::async_trait]
pub trait AccountRepo: Send + Sync {
    async fn get_by_username(&self, username: &str) -> DbResult<Option<Account>>;

    /// Stores a new account. Must fail with `DbError::UniqueViolation` when the
    /// username is already taken, even if a concurrent insert won the race.
    async fn insert_account(&self, account: Account) -> DbResult<Account>;
}
