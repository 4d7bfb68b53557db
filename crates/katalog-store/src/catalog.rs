//! Persisted output catalog.

use std::io;
use std::path::Path;

use katalog_core::{Catalog, CatalogSchema};
use katalog_feed::{write_catalog, ProductReader};

use crate::error::StoreError;
use crate::fs::write_atomic;

/// Reads the catalog at `path` strictly.
///
/// # Errors
///
/// Returns [`StoreError::Feed`] if the file cannot be opened or is not a
/// well-formed catalog.
pub fn read_catalog(path: &Path, schema: &CatalogSchema) -> Result<Catalog, StoreError> {
    let products = ProductReader::from_path(path, schema)?.collect::<Result<Vec<_>, _>>()?;
    Ok(Catalog { products })
}

/// Loads the prior catalog, tolerating its absence or corruption.
///
/// A missing file yields an empty catalog. An unreadable or malformed file
/// is logged and also yields an empty catalog.
#[must_use]
pub fn load_prior_catalog(path: &Path, schema: &CatalogSchema) -> Catalog {
    match read_catalog(path, schema) {
        Ok(catalog) => {
            tracing::info!(path = %path.display(), products = catalog.len(), "loaded prior catalog");
            catalog
        }
        Err(StoreError::Feed(katalog_feed::FeedError::Io(e))) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no prior catalog, starting empty");
            Catalog::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read prior catalog, starting empty");
            Catalog::default()
        }
    }
}

/// Writes `catalog` to `path` via a temporary sibling and rename.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be written; the previous
/// catalog stays in place.
pub fn save_catalog(
    path: &Path,
    catalog: &Catalog,
    schema: &CatalogSchema,
) -> Result<(), StoreError> {
    write_atomic(path, |w| Ok(write_catalog(w, catalog, schema)?))?;
    tracing::info!(path = %path.display(), products = catalog.len(), "catalog written");
    Ok(())
}
