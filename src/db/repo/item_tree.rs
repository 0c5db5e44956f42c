use crate::db::DbResult;
use crate::db::error::DbError;
use crate::db::repo::item::{ItemRepo, ItemScan, LoadedRecord};
use crate::db::repo::item_fs::{ensure_root, list_dir, read_record, source_of};
use crate::models::item::{Item, SkipReason};
use crate::models::types::ItemId;
use std::path::PathBuf;

/// How many directory levels below the root are walked.
pub const MAX_DEPTH: usize = 4;

/// Item catalog stored as a tree of category directories:
///
/// ```text
/// items/
///   cons/1/1.json      <- category with one grouping level
///   cons/1/2.json
///   misc/3.json        <- category holding records directly
/// ```
///
/// Each directory is classified by looking at its children: one that contains
/// sub-directories is a container and is descended into, one that doesn't is a
/// leaf group whose `*.json` files are the records.
pub struct ItemTreeStore {
    root: PathBuf,
}

impl ItemTreeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn walk(&self) -> DbResult<Vec<(String, LoadedRecord)>> {
        ensure_root(&self.root).await?;

        // Loose files at the root are not part of any category.
        let top = list_dir(&self.root)
            .await
            .map_err(|e| DbError::unavailable(&self.root, e))?;

        let mut records = Vec::new();
        let mut pending: Vec<(PathBuf, usize)> =
            top.dirs.into_iter().rev().map(|d| (d, 1)).collect();

        while let Some((dir, depth)) = pending.pop() {
            let source = source_of(&self.root, &dir);

            let listing = match list_dir(&dir).await {
                Ok(listing) => listing,
                Err(e) => {
                    let reason = SkipReason::Unreadable(e.to_string());
                    records.push((source, LoadedRecord::Skipped(reason)));
                    continue;
                }
            };

            if listing.dirs.is_empty() {
                for path in listing.records {
                    let record = read_record(&path, None).await;
                    records.push((source_of(&self.root, &path), record));
                }
                continue;
            }

            if depth >= MAX_DEPTH {
                records.push((source, LoadedRecord::Skipped(SkipReason::TooDeep(MAX_DEPTH))));
                continue;
            }

            if !listing.records.is_empty() {
                tracing::debug!(
                    dir = %source,
                    ignored = listing.records.len(),
                    "ignoring records next to sub-directories"
                );
            }
            pending.extend(listing.dirs.into_iter().rev().map(|d| (d, depth + 1)));
        }

        Ok(records)
    }
}

#[async_trait::async_trait]
impl ItemRepo for ItemTreeStore {
    async fn scan(&self) -> DbResult<ItemScan> {
        let records = self.walk().await?;
        Ok(ItemScan::collect(records))
    }

    /// The category of an id is unknown, so this walks the whole tree.
    async fn get_by_id(&self, id: ItemId) -> DbResult<Option<Item>> {
        let scan = self.scan().await?;
        Ok(scan.find(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn record(dir: &Path, id: u32, name: &str, type_id: u8) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join(format!("{id}.json")),
            format!(
                r#"{{"id": {id}, "name": "{name}", "type": {type_id}, "description": "{name}!"}}"#
            ),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn mixed_category_shapes() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        record(&root.join("misc"), 3, "Rope", 3);
        record(&root.join("cons").join("1"), 1, "Potion", 1);
        record(&root.join("cons").join("2"), 2, "Elixir", 1);

        let store = ItemTreeStore::new(root);
        let scan = store.scan().await.unwrap();

        let ids: Vec<u32> = scan.items.iter().map(|i| i.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(scan.skipped.is_empty());
    }

    #[tokio::test]
    async fn records_next_to_groups_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        record(&root.join("equip").join("swords"), 10, "Sword", 2);
        record(&root.join("equip"), 11, "Loose", 2);

        let items = ItemTreeStore::new(root).list_all().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.get(), 10);
    }

    #[tokio::test]
    async fn walk_is_bounded() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let mut deep = root.to_path_buf();
        for level in 0..=MAX_DEPTH {
            deep = deep.join(format!("l{level}"));
        }
        record(&deep, 1, "Buried", 3);
        record(&root.join("misc"), 2, "Rope", 3);

        let scan = ItemTreeStore::new(root).scan().await.unwrap();
        assert_eq!(scan.items.len(), 1);
        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(scan.skipped[0].reason, SkipReason::TooDeep(MAX_DEPTH));
    }

    #[tokio::test]
    async fn non_json_files_are_not_records() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        record(&root.join("misc"), 3, "Rope", 3);
        fs::write(root.join("misc").join("README.md"), "notes").unwrap();
        fs::write(root.join("index.json"), "{}").unwrap();

        let scan = ItemTreeStore::new(root).scan().await.unwrap();
        assert_eq!(scan.items.len(), 1);
        assert!(scan.skipped.is_empty());
    }

    #[tokio::test]
    async fn root_that_is_a_file_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("items");
        fs::write(&file, "").unwrap();

        let err = ItemTreeStore::new(&file).scan().await.unwrap_err();
        assert!(matches!(err, DbError::NotADirectory(_)));
    }
}
