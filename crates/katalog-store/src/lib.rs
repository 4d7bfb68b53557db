//! File persistence for the output catalog and the translation-id set.

pub mod catalog;
pub mod error;
mod fs;
pub mod ids;

pub use catalog::{load_prior_catalog, read_catalog, save_catalog};
pub use error::StoreError;
pub use ids::{load_ids, save_ids};
