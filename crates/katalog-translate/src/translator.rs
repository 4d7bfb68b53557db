//! The translation seam and its explicit outcome type.

use std::future::Future;

use crate::error::TranslateError;

/// A text translation service for a fixed language pair.
pub trait Translator {
    /// Translates `text`, which the caller guarantees is not blank.
    fn translate(&self, text: &str) -> impl Future<Output = Result<String, TranslateError>>;
}

/// Result of passing one field through [`translate_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Translated(String),
    /// Blank input, returned as-is without calling the service.
    Blank(String),
    /// The service failed; carries the untouched original text.
    Fallback { original: String, reason: String },
}

impl Translation {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Translated(t) | Self::Blank(t) => t,
            Self::Fallback { original, .. } => original,
        }
    }

    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Translated(t) | Self::Blank(t) => t,
            Self::Fallback { original, .. } => original,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Translates one field, never failing.
///
/// Empty or whitespace-only input skips the service. Service errors are
/// logged and yield [`Translation::Fallback`] with the original text.
pub async fn translate_text<T: Translator>(translator: &T, text: &str) -> Translation {
    if text.trim().is_empty() {
        return Translation::Blank(text.to_owned());
    }

    match translator.translate(text).await {
        Ok(translated) => Translation::Translated(translated),
        Err(e) => {
            tracing::warn!(error = %e, text, "translation failed, keeping original text");
            Translation::Fallback {
                original: text.to_owned(),
                reason: e.to_string(),
            }
        }
    }
}
