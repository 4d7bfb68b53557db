//! Translation and exchange-rate collaborators for the catalog merge.

pub mod error;
pub mod google;
pub mod rate;
pub mod translator;

pub use error::TranslateError;
pub use google::{GoogleTranslator, MAX_TEXT_CHARS};
pub use rate::{resolve_rate, RateClient, RateQuote, RateSource};
pub use translator::{translate_text, Translation, Translator};
