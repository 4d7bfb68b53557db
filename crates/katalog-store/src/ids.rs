//! Persisted set of translation ids.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use katalog_core::TranslatedIds;

use crate::error::StoreError;
use crate::fs::write_atomic;

/// Loads the id set from a flat JSON array. A missing file is an empty set.
///
/// # Errors
///
/// - [`StoreError::Io`] if the file exists but cannot be read.
/// - [`StoreError::Json`] if it is not a JSON array of strings.
pub fn load_ids(path: &Path) -> Result<TranslatedIds, StoreError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no translation id file, starting empty");
            return Ok(TranslatedIds::new());
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let ids: TranslatedIds = serde_json::from_str(&data).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), ids = ids.len(), "loaded translation ids");
    Ok(ids)
}

/// Saves the id set as a JSON array, non-ASCII text unescaped.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be written.
pub fn save_ids(path: &Path, ids: &TranslatedIds) -> Result<(), StoreError> {
    write_atomic(path, |w| {
        serde_json::to_writer(&mut *w, ids).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        w.write_all(b"\n").map_err(|e| StoreError::io(path, e))
    })?;
    tracing::info!(path = %path.display(), ids = ids.len(), "translation ids written");
    Ok(())
}
