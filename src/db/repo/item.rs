use crate::db::DbResult;
use crate::models::item::{Item, SkipReason};
use crate::models::types::ItemId;

/// Outcome of loading a single stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedRecord {
    Ok(Item),
    Skipped(SkipReason),
}

impl From<Result<Item, SkipReason>> for LoadedRecord {
    fn from(res: Result<Item, SkipReason>) -> Self {
        match res {
            Ok(item) => LoadedRecord::Ok(item),
            Err(reason) => LoadedRecord::Skipped(reason),
        }
    }
}

/// A record that was left out of the catalog, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub source: String,
    pub reason: SkipReason,
}

/// Result of enumerating a store: the valid items, ordered by id without
/// duplicates, and the records that were skipped along the way.
#[derive(Debug, Clone, Default)]
pub struct ItemScan {
    pub items: Vec<Item>,
    pub skipped: Vec<Skipped>,
}

impl ItemScan {
    /// Builds the catalog from loaded records in any order.
    ///
    /// Items are sorted by id. When several records share an id, the one with
    /// the lexicographically smallest source wins and the others are reported
    /// as duplicates, so the outcome never depends on enumeration order.
    pub fn collect<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, LoadedRecord)>,
    {
        let mut loaded = Vec::new();
        let mut skipped = Vec::new();

        for (source, record) in records {
            match record {
                LoadedRecord::Ok(item) => loaded.push((source, item)),
                LoadedRecord::Skipped(reason) => skipped.push(Skipped { source, reason }),
            }
        }

        loaded.sort_by(|(sa, a), (sb, b)| a.id.cmp(&b.id).then_with(|| sa.cmp(sb)));

        let mut items: Vec<Item> = Vec::with_capacity(loaded.len());
        for (source, item) in loaded {
            if items.last().is_some_and(|last| last.id == item.id) {
                skipped.push(Skipped {
                    source,
                    reason: SkipReason::DuplicateId(item.id),
                });
                continue;
            }
            items.push(item);
        }

        skipped.sort_by(|a, b| a.source.cmp(&b.source));
        for s in &skipped {
            tracing::warn!(source = %s.source, reason = %s.reason, "skipping catalog record");
        }

        Self { items, skipped }
    }

    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items
            .binary_search_by(|item| item.id.cmp(&id))
            .ok()
            .map(|idx| &self.items[idx])
    }
}

/// Read access to the item catalog. Implemented by every backing store; the
/// concrete store is picked once at startup.
#[async_trait::async_trait]
pub trait ItemRepo: Send + Sync {
    /// Enumerates the whole store. Fails only when the store itself cannot be
    /// reached; bad records end up in [`ItemScan::skipped`].
    async fn scan(&self) -> DbResult<ItemScan>;

    /// Looks up a single item. `Ok(None)` when there is no (valid) record for `id`.
    async fn get_by_id(&self, id: ItemId) -> DbResult<Option<Item>>;

    async fn list_all(&self) -> DbResult<Vec<Item>> {
        Ok(self.scan().await?.items)
    }
}
