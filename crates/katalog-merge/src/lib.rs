//! Currency conversion and the incremental catalog merge engine.

pub mod currency;
pub mod engine;

pub use currency::{convert_price, format_usd, PriceConversion};
pub use engine::{merge_catalog, MergeError, MergeOptions, MergeOutcome, MergeReport, MergeState};
