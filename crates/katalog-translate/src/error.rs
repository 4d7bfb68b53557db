use thiserror::Error;

/// Failures of the translation and exchange-rate collaborators.
///
/// Callers never propagate these past the merge; they are turned into
/// fallback outcomes at the call site.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The service answered but the payload held no translated segments.
    #[error("translation response contained no text")]
    EmptyResponse,

    #[error("text of {len} characters exceeds the {max} character limit")]
    TextTooLong { len: usize, max: usize },

    #[error("rate for {currency} missing from response")]
    MissingRate { currency: String },

    #[error("invalid exchange rate: {0}")]
    InvalidRate(String),
}
