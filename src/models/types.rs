use crate::error::DomainError;
use serde::{Deserialize, Serialize};

#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Copy,
            Clone,
            Debug,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            postgres_types::ToSql,
            postgres_types::FromSql,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[repr(transparent)]
        #[postgres(transparent)]
        #[serde(transparent)] // JSON = plain UUID string
        pub struct $name(pub uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            #[inline]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(AccountId);

/// Public catalog key of an item. Always strictly positive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u32);

impl ItemId {
    /// Returns `None` for zero, negative or out of range values.
    pub fn new(raw: i64) -> Option<Self> {
        u32::try_from(raw).ok().filter(|v| *v > 0).map(Self)
    }

    #[inline]
    pub fn get(&self) -> u32 {
        self.0
    }

    /// File name used by the file-backed stores (`<id>.json`).
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strict parsing of a raw path segment: ascii digits only, no sign, no
/// surrounding whitespace, value in `1..=u32::MAX`.
impl core::str::FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::Validation {
            field: "id",
            message: "must be a positive integer".into(),
        };

        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let value: u32 = s.parse().map_err(|_| invalid())?;
        if value == 0 {
            return Err(invalid());
        }

        Ok(Self(value))
    }
}

/// Item category as stored in the catalog (`typeId` / `type`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "i64")]
pub enum ItemTypeId {
    Consumable,
    Equipment,
    Miscellaneous,
}

impl ItemTypeId {
    pub fn code(&self) -> u8 {
        match self {
            ItemTypeId::Consumable => 1,
            ItemTypeId::Equipment => 2,
            ItemTypeId::Miscellaneous => 3,
        }
    }
}

impl From<ItemTypeId> for u8 {
    fn from(t: ItemTypeId) -> Self {
        t.code()
    }
}

impl TryFrom<i64> for ItemTypeId {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ItemTypeId::Consumable),
            2 => Ok(ItemTypeId::Equipment),
            3 => Ok(ItemTypeId::Miscellaneous),
            other => Err(format!("unknown item type code {other}")),
        }
    }
}

impl core::fmt::Display for ItemTypeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ItemTypeId::Consumable => f.write_str("consumable"),
            ItemTypeId::Equipment => f.write_str("equipment"),
            ItemTypeId::Miscellaneous => f.write_str("miscellaneous"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_parses_positive_integers_only() {
        assert_eq!("1".parse::<ItemId>().unwrap().get(), 1);
        assert_eq!("4294967295".parse::<ItemId>().unwrap().get(), u32::MAX);

        for raw in ["", "0", "000", "-1", "+1", "abc", "12abc", " 1", "1.5", "4294967296"] {
            assert!(raw.parse::<ItemId>().is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn item_id_from_stored_value() {
        assert_eq!(ItemId::new(7).map(|i| i.get()), Some(7));
        assert!(ItemId::new(0).is_none());
        assert!(ItemId::new(-3).is_none());
        assert!(ItemId::new(i64::from(u32::MAX) + 1).is_none());
    }

    #[test]
    fn item_type_roundtrips_through_code() {
        assert_eq!(ItemTypeId::try_from(2).unwrap(), ItemTypeId::Equipment);
        assert!(ItemTypeId::try_from(9).is_err());
        assert_eq!(serde_json::to_string(&ItemTypeId::Miscellaneous).unwrap(), "3");
    }
}
