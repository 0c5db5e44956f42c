use crate::config::{Config, StoreKind};
use crate::db::Db;
use crate::db::repo::{AccountFileStore, AccountRepo, AccountRepository};
use crate::db::repo::{ItemFlatStore, ItemRepo, ItemRepository, ItemTreeStore};
use crate::error::{AppResult, ConfigErrorKind, InfraError};
use crate::services::{AccountService, ItemService};
use std::path::PathBuf;
use std::sync::Arc;

pub struct Repos {
    pub items: Arc<dyn ItemRepo>,
    pub accounts: Arc<dyn AccountRepo>,
}

pub struct Services {
    pub items: Arc<ItemService>,
    pub accounts: Arc<AccountService>,
}

/// Everything a request handler needs. Built once at startup from the
/// configured store and shared behind an `Arc`.
pub struct Registry {
    pub db: Option<Arc<Db>>,
    pub repos: Arc<Repos>,
    pub services: Arc<Services>,
    pub config: Arc<Config>,
}

impl Registry {
    /// Opens the configured store. For the document store this connects the
    /// pool and runs the migrations.
    pub async fn open(config: Arc<Config>) -> AppResult<Self> {
        match config.item_store {
            StoreKind::Tree => {
                let repos = Repos {
                    items: Arc::new(ItemTreeStore::new(&config.items_dir)),
                    accounts: Arc::new(AccountFileStore::new(&config.accounts_dir)),
                };
                Ok(Self::with_repos(config, repos, None))
            }
            StoreKind::Flat => {
                let repos = Repos {
                    items: Arc::new(ItemFlatStore::new(&config.items_dir)),
                    accounts: Arc::new(AccountFileStore::new(&config.accounts_dir)),
                };
                Ok(Self::with_repos(config, repos, None))
            }
            StoreKind::Document => {
                let url = config.database_url.as_deref().ok_or_else(|| InfraError::Config {
                    path: PathBuf::from(".env"),
                    source: ConfigErrorKind::MissingEnv("DATABASE_URL".to_string()),
                })?;

                let db = Arc::new(Db::new(url)?);
                db.init().await?;

                let repos = Repos {
                    items: Arc::new(ItemRepository::new(db.clone())),
                    accounts: Arc::new(AccountRepository::new(db.clone())),
                };
                Ok(Self::with_repos(config, repos, Some(db)))
            }
        }
    }

    pub fn with_repos(config: Arc<Config>, repos: Repos, db: Option<Arc<Db>>) -> Self {
        let repos = Arc::new(repos);

        let services = Arc::new(Services {
            items: Arc::new(ItemService::new(repos.items.clone())),
            accounts: Arc::new(AccountService::new(repos.accounts.clone())),
        });

        Self {
            db,
            repos,
            services,
            config,
        }
    }

    /// Releases the store handle. File stores hold nothing open.
    pub fn close(&self) {
        if let Some(db) = &self.db {
            db.close();
            tracing::info!("document store closed");
        }
    }
}
