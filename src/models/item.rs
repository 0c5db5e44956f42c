use crate::models::types::{ItemId, ItemTypeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public shape of a catalog item, as returned by the list and get endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub type_id: ItemTypeId,
}

/// Why a stored record did not make it into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("unreadable: {0}")]
    Unreadable(String),

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("record id {found} does not match its key {expected}")]
    IdMismatch { expected: ItemId, found: ItemId },

    #[error("duplicate id {0}")]
    DuplicateId(ItemId),

    #[error("nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Stored record. Both the minimal (`type`) and the extended (`typeId`,
/// `rarity`, `stats`, ...) shapes deserialize into this; unknown fields are
/// dropped. When a record carries both type fields, `typeId` wins.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
    id: i64,
    name: String,
    description: String,
    #[serde(default)]
    type_id: Option<i64>,
    #[serde(default, rename = "type")]
    type_code: Option<i64>,
}

impl StoredItem {
    fn normalize(self) -> Result<Item, SkipReason> {
        let id = ItemId::new(self.id).ok_or_else(|| SkipReason::Invalid {
            field: "id",
            message: format!("{} is not a positive integer", self.id),
        })?;

        if self.name.trim().is_empty() {
            return Err(SkipReason::Invalid {
                field: "name",
                message: "cannot be empty".into(),
            });
        }

        let code = self
            .type_id
            .or(self.type_code)
            .ok_or_else(|| SkipReason::Malformed("missing field `type`".into()))?;
        let type_id = ItemTypeId::try_from(code).map_err(|message| SkipReason::Invalid {
            field: "typeId",
            message,
        })?;

        Ok(Item {
            id,
            name: self.name,
            description: self.description,
            type_id,
        })
    }
}

impl Item {
    /// Parses and validates raw file contents.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SkipReason> {
        let stored: StoredItem =
            serde_json::from_slice(bytes).map_err(|e| SkipReason::Malformed(e.to_string()))?;
        stored.normalize()
    }

    /// Parses and validates a document from the document store.
    pub fn from_document(doc: serde_json::Value) -> Result<Self, SkipReason> {
        let stored: StoredItem =
            serde_json::from_value(doc).map_err(|e| SkipReason::Malformed(e.to_string()))?;
        stored.normalize()
    }

    /// Like [`Item::from_slice`], but the record must also carry the id it is
    /// stored under.
    pub fn from_keyed_slice(key: ItemId, bytes: &[u8]) -> Result<Self, SkipReason> {
        Self::from_slice(bytes).and_then(|item| item.expect_key(key))
    }

    pub(crate) fn expect_key(self, key: ItemId) -> Result<Self, SkipReason> {
        if self.id != key {
            return Err(SkipReason::IdMismatch {
                expected: key,
                found: self.id,
            });
        }
        Ok(self)
    }
}
