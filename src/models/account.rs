use crate::db::DbResult;
use crate::error::{AppResult, DomainError};
use crate::models::types::AccountId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").expect("valid username regex"));

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique Account ID
    pub id: AccountId,
    /// Username (distinct)
    pub username: String,
    /// Hashed password (argon, PHC string)
    pub password_hash: String,
    /// Account creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Account {
    pub fn try_from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get::<_, AccountId>("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub fn validate_username(s: &str) -> AppResult<()> {
        if s.is_empty() {
            return Err(DomainError::Validation {
                field: "username",
                message: "cannot be empty".into(),
            });
        }
        if !USERNAME_RE.is_match(s) {
            return Err(DomainError::Validation {
                field: "username",
                message: "must be 3-20 characters (letters, digits and underscore only)".into(),
            });
        }
        Ok(())
    }

    pub fn validate_password(s: &str) -> AppResult<()> {
        if s.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation {
                field: "password",
                message: format!("must be at least {MIN_PASSWORD_LEN} characters"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        for ok in ["abc", "hero_01", "ABCDEFGHIJKLMNOPQRST"] {
            assert!(Account::validate_username(ok).is_ok(), "{ok}");
        }
        for bad in ["", "ab", "has space", "dash-ed", "ABCDEFGHIJKLMNOPQRSTU", "ação"] {
            assert!(Account::validate_username(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn passwords() {
        assert!(Account::validate_password("secret").is_ok());
        assert!(matches!(
            Account::validate_password("12345"),
            Err(DomainError::Validation { field: "password", .. })
        ));
    }
}
