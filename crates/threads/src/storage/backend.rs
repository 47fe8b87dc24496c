use std::{net::IpAddr, time::Duration};

use thiserror::Error;
use threads_messages::DecodeError;

/// One year, the lifetime of everything the adapter persists.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("stored value for `{key}` could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: DecodeError,
    },
    #[error("local storage file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("local storage file could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BackendKind {
    Cookie,
    LocalStorage,
}

/// Packaged and offline pages (`file:`, `chrome-extension:`) cannot hold
/// cookies, so they persist into local storage instead.
pub fn select_backend(protocol: &str) -> BackendKind {
    match protocol {
        "file:" | "chrome-extension:" => BackendKind::LocalStorage,
        _ => BackendKind::Cookie,
    }
}

/// Where a read or write happens: the page host and whether it is served securely.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Origin {
    pub host: Option<String>,
    pub secure: bool,
}

impl Origin {
    pub fn from_href(href: &str) -> Self {
        match reqwest::Url::parse(href) {
            Ok(url) => Self {
                host: url
                    .host_str()
                    .filter(|host| !host.is_empty())
                    .map(|host| host.to_ascii_lowercase()),
                secure: url.scheme() == "https",
            },
            Err(_) => Self::default(),
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn is_ip_literal(&self) -> bool {
        self.host().is_some_and(is_ip_literal)
    }
}

pub fn is_ip_literal(host: &str) -> bool {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok()
}

/// Attributes of a single write. Built per call; never shared.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WriteOptions {
    /// Cookie `Domain` attribute, leading dot included. `None` means host-only.
    pub domain: Option<String>,
    pub path: String,
    pub max_age: Duration,
    pub secure: bool,
}

impl WriteOptions {
    pub fn persistent(domain: Option<String>) -> Self {
        Self {
            domain,
            path: "/".to_string(),
            max_age: DEFAULT_MAX_AGE,
            secure: false,
        }
    }

    pub fn without_domain(&self) -> Self {
        Self {
            domain: None,
            ..self.clone()
        }
    }
}

/// A string key/value persistence primitive.
///
/// `set` with `None` removes the key. Backends may silently refuse a write
/// (as browsers do for unacceptable cookie domains); callers verify by reading.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, origin: &Origin, key: &str) -> Result<Option<String>, StorageError>;

    fn set(
        &self,
        origin: &Origin,
        key: &str,
        value: Option<&str>,
        options: &WriteOptions,
    ) -> Result<(), StorageError>;
}
