//! Helpers shared by the file-backed item stores.

use crate::db::DbResult;
use crate::db::error::DbError;
use crate::db::repo::item::LoadedRecord;
use crate::models::item::{Item, SkipReason};
use crate::models::types::ItemId;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Record files larger than this are never parsed.
pub(crate) const MAX_RECORD_BYTES: u64 = 1_000_000;

/// The root must exist and be a directory, anything below it is allowed to fail.
pub(crate) async fn ensure_root(root: &Path) -> DbResult<()> {
    let meta = fs::metadata(root).await.map_err(|e| DbError::unavailable(root, e))?;
    if !meta.is_dir() {
        return Err(DbError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub(crate) struct DirListing {
    pub dirs: Vec<PathBuf>,
    pub records: Vec<PathBuf>,
}

/// Lists a directory, splitting children into sub-directories and `*.json`
/// record files. Anything else is ignored. Symlinks are followed.
pub(crate) async fn list_dir(dir: &Path) -> std::io::Result<DirListing> {
    let mut listing = DirListing::default();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot stat entry");
                continue;
            }
        };

        if meta.is_dir() {
            listing.dirs.push(path);
        } else if meta.is_file() && is_record_file(&path) {
            listing.records.push(path);
        }
    }

    // read_dir order is unspecified
    listing.dirs.sort();
    listing.records.sort();
    Ok(listing)
}

pub(crate) fn is_record_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json")
}

/// Reads and validates one record file. When `key` is given the record must
/// carry that id.
pub(crate) async fn read_record(path: &Path, key: Option<ItemId>) -> LoadedRecord {
    match fs::metadata(path).await {
        Ok(meta) if meta.len() > MAX_RECORD_BYTES => {
            return LoadedRecord::Skipped(SkipReason::Unreadable(format!(
                "file is {} bytes, limit is {MAX_RECORD_BYTES}",
                meta.len()
            )));
        }
        Ok(_) => {}
        Err(e) => return LoadedRecord::Skipped(SkipReason::Unreadable(e.to_string())),
    }

    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => return LoadedRecord::Skipped(SkipReason::Unreadable(e.to_string())),
    };

    match key {
        Some(key) => Item::from_keyed_slice(key, &bytes).into(),
        None => Item::from_slice(&bytes).into(),
    }
}

/// `<id>.json` -> id. Only the canonical spelling is a key (`007.json` is not),
/// so every listed record can be found again by its id.
pub(crate) fn key_from_file_name(path: &Path) -> Result<ItemId, SkipReason> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let invalid = |message: String| SkipReason::Invalid {
        field: "file name",
        message,
    };

    let key = stem
        .parse::<ItemId>()
        .map_err(|_| invalid(format!("{stem:?} is not a positive integer id")))?;

    if path.file_name().and_then(|s| s.to_str()) != Some(key.file_name().as_str()) {
        return Err(invalid(format!("{stem:?} is not the canonical name {}", key.file_name())));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_canonical_file_names_are_keys() {
        let key = key_from_file_name(Path::new("items/42.json")).unwrap();
        assert_eq!(key.get(), 42);

        for name in ["items/007.json", "items/0.json", "items/abc.json", "items/4294967296.json"] {
            assert!(
                matches!(
                    key_from_file_name(Path::new(name)),
                    Err(SkipReason::Invalid { field: "file name", .. })
                ),
                "{name} should not be a key"
            );
        }
    }
}

/// Path relative to the store root, for diagnostics.
pub(crate) fn source_of(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
