use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML: {reason}")]
    Malformed { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

impl FeedError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}
