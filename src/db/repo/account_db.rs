use crate::db::error::DbError;
use crate::db::repo::account::AccountRepo;
use crate::db::{Db, DbResult, map_row_opt};
use crate::models::account::Account;
use std::sync::Arc;
use tokio_postgres::error::SqlState;

pub struct AccountRepository {
    db: Arc<Db>,
}

impl AccountRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl AccountRepo for AccountRepository {
    async fn get_by_username(&self, username: &str) -> DbResult<Option<Account>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                "SELECT id, username, password_hash, created_at FROM accounts WHERE username = $1",
            )
            .await?;

        let row_opt = client.query_opt(&stmt, &[&username]).await?;
        map_row_opt(
            row_opt,
            Account::try_from_row,
            &format!("AccountRepo::get_by_username username={}", username),
        )
    }

    async fn insert_account(&self, account: Account) -> DbResult<Account> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                r#"
            INSERT INTO accounts (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, created_at
            "#,
            )
            .await?;

        let row = client
            .query_one(
                &stmt,
                &[&account.id, &account.username, &account.password_hash, &account.created_at],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    DbError::UniqueViolation
                } else {
                    DbError::Pg(e)
                }
            })?;

        Account::try_from_row(&row)
    }
}
