use thiserror::Error;
use threads_messages::MessageError;

use crate::transport::TransportError;

/// Errors surfaced by the Threads client. Storage problems never appear here.
#[derive(Debug, Error)]
pub enum ThreadsError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },
    #[error("collector at {url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to serialize payload: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("invalid integration settings: {0}")]
    InvalidSettings(#[source] serde_json::Error),
    #[error(transparent)]
    InvalidMessage(#[from] MessageError),
}

impl ThreadsError {
    /// The destination URL, for errors that happened while delivering.
    pub fn url(&self) -> Option<&str> {
        match self {
            ThreadsError::Transport { url, .. } | ThreadsError::Status { url, .. } => Some(url),
            _ => None,
        }
    }
}
