use crate::db::DbResult;
use crate::db::error::DbError;
use crate::db::repo::item::{ItemRepo, ItemScan, LoadedRecord};
use crate::db::repo::item_fs::{ensure_root, key_from_file_name, list_dir, read_record, source_of};
use crate::models::item::Item;
use crate::models::types::ItemId;
use std::path::PathBuf;

/// Item catalog stored as a single directory of `<id>.json` files. The file
/// name is the key, so lookups read exactly one file.
pub struct ItemFlatStore {
    root: PathBuf,
}

impl ItemFlatStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait::async_trait]
impl ItemRepo for ItemFlatStore {
    async fn scan(&self) -> DbResult<ItemScan> {
        ensure_root(&self.root).await?;
        let listing = list_dir(&self.root)
            .await
            .map_err(|e| DbError::unavailable(&self.root, e))?;

        let mut records = Vec::with_capacity(listing.records.len());
        for path in listing.records {
            let record = match key_from_file_name(&path) {
                Ok(key) => read_record(&path, Some(key)).await,
                Err(reason) => LoadedRecord::Skipped(reason),
            };
            records.push((source_of(&self.root, &path), record));
        }

        Ok(ItemScan::collect(records))
    }

    async fn get_by_id(&self, id: ItemId) -> DbResult<Option<Item>> {
        ensure_root(&self.root).await?;

        let path = self.root.join(id.file_name());
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        match read_record(&path, Some(id)).await {
            LoadedRecord::Ok(item) => Ok(Some(item)),
            LoadedRecord::Skipped(reason) => {
                tracing::warn!(
                    source = %source_of(&self.root, &path),
                    %reason,
                    "skipping catalog record"
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::SkipReason;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &std::path::Path, file: &str, body: &str) {
        fs::write(root.join(file), body).unwrap();
    }

    #[tokio::test]
    async fn direct_lookup_by_file_name() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "7.json",
            r#"{"id": 7, "name": "Torch", "typeId": 3, "description": ""}"#,
        );

        let store = ItemFlatStore::new(tmp.path());
        let hit = store.get_by_id(ItemId::new(7).unwrap()).await.unwrap();
        assert_eq!(hit.map(|i| i.name), Some("Torch".to_string()));

        let miss = store.get_by_id(ItemId::new(8).unwrap()).await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn misnamed_records_are_skipped_everywhere() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "5.json",
            r#"{"id": 6, "name": "Shield", "typeId": 2, "description": ""}"#,
        );
        write(
            tmp.path(),
            "shield.json",
            r#"{"id": 9, "name": "Shield", "typeId": 2, "description": ""}"#,
        );

        let store = ItemFlatStore::new(tmp.path());
        let scan = store.scan().await.unwrap();
        assert!(scan.items.is_empty());
        assert_eq!(scan.skipped.len(), 2);
        assert!(matches!(scan.skipped[0].reason, SkipReason::IdMismatch { .. }));
        assert!(matches!(scan.skipped[1].reason, SkipReason::Invalid { field: "file name", .. }));

        assert!(store.get_by_id(ItemId::new(5).unwrap()).await.unwrap().is_none());
        assert!(store.get_by_id(ItemId::new(6).unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_lookup_is_not_found() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "4.json", "{ truncated");

        let store = ItemFlatStore::new(tmp.path());
        assert!(store.get_by_id(ItemId::new(4).unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_root_is_unavailable_for_lookups_too() {
        let tmp = TempDir::new().unwrap();
        let store = ItemFlatStore::new(tmp.path().join("nope"));

        let err = store.get_by_id(ItemId::new(1).unwrap()).await.unwrap_err();
        assert!(matches!(err, DbError::Unavailable { .. }));
    }
}
