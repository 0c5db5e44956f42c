use crate::db::repo::item::{ItemRepo, ItemScan, LoadedRecord};
use crate::db::{Db, DbResult};
use crate::models::item::{Item, SkipReason};
use crate::models::types::ItemId;
use std::sync::Arc;
use tokio_postgres::Row;

/// Item catalog kept as JSONB documents in postgres, keyed by id.
pub struct ItemRepository {
    db: Arc<Db>,
}

impl ItemRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Inserts or replaces the document stored under `item.id`.
    pub async fn upsert(&self, item: &Item) -> DbResult<()> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                r#"
            INSERT INTO items (id, doc)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc
            "#,
            )
            .await?;

        let doc = serde_json::to_value(item)?;
        client.execute(&stmt, &[&i64::from(item.id.get()), &doc]).await?;

        Ok(())
    }
}

/// Turns a stored row into a catalog record. Rows whose document disagrees
/// with the key column are rejected.
pub(crate) fn load_document(key: i64, doc: serde_json::Value) -> LoadedRecord {
    let Some(key) = ItemId::new(key) else {
        return LoadedRecord::Skipped(SkipReason::Invalid {
            field: "id",
            message: format!("row key {key} is not a positive integer"),
        });
    };

    Item::from_document(doc).and_then(|item| item.expect_key(key)).into()
}

fn load_row(row: &Row) -> (String, LoadedRecord) {
    let key = match row.try_get::<_, i64>("id") {
        Ok(key) => key,
        Err(e) => {
            let reason = SkipReason::Unreadable(e.to_string());
            return ("items/?".to_string(), LoadedRecord::Skipped(reason));
        }
    };

    let source = format!("items/{key}");
    match row.try_get::<_, serde_json::Value>("doc") {
        Ok(doc) => (source, load_document(key, doc)),
        Err(e) => (source, LoadedRecord::Skipped(SkipReason::Unreadable(e.to_string()))),
    }
}

#[async_trait::async_trait]
impl ItemRepo for ItemRepository {
    async fn scan(&self) -> DbResult<ItemScan> {
        let client = self.db.get_client().await?;

        let stmt = client.prepare_cached("SELECT id, doc FROM items").await?;
        let rows = client.query(&stmt, &[]).await?;

        Ok(ItemScan::collect(rows.iter().map(load_row)))
    }

    async fn get_by_id(&self, id: ItemId) -> DbResult<Option<Item>> {
        let client = self.db.get_client().await?;

        let stmt = client.prepare_cached("SELECT id, doc FROM items WHERE id = $1").await?;
        let Some(row) = client.query_opt(&stmt, &[&i64::from(id.get())]).await? else {
            return Ok(None);
        };

        match load_row(&row) {
            (_, LoadedRecord::Ok(item)) => Ok(Some(item)),
            (source, LoadedRecord::Skipped(reason)) => {
                tracing::warn!(%source, %reason, "skipping catalog record");
                Ok(None)
            }
        }
    }
}
