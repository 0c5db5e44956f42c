use crate::db::repo::ItemRepo;
use crate::error::AppResult;
use crate::models::item::Item;
use crate::models::types::ItemId;
use std::sync::Arc;

pub struct ItemService {
    repo: Arc<dyn ItemRepo>,
}

impl ItemService {
    pub fn new(repo: Arc<dyn ItemRepo>) -> Self {
        Self { repo }
    }

    /// Full catalog, ordered by id. Skipped records are logged by the scan.
    pub async fn list_all(&self) -> AppResult<Vec<Item>> {
        let scan = self.repo.scan().await?;
        tracing::debug!(items = scan.items.len(), skipped = scan.skipped.len(), "catalog scanned");
        Ok(scan.items)
    }

    pub async fn get_by_id(&self, id: ItemId) -> AppResult<Option<Item>> {
        let item = self.repo.get_by_id(id).await?;
        if item.is_none() {
            tracing::debug!(%id, "item not found");
        }
        Ok(item)
    }
}
