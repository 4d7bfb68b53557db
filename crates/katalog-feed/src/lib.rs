//! XML plumbing for the vendor feed and the output catalog.
//!
//! [`ProductReader`] streams products out of a document one at a time,
//! [`write_catalog`] serializes a merged catalog, and [`FeedClient`]
//! downloads the remote feed to disk.

pub mod client;
pub mod error;
pub mod reader;
pub mod writer;

pub use client::FeedClient;
pub use error::FeedError;
pub use reader::{check_well_formed, ProductReader};
pub use writer::write_catalog;
