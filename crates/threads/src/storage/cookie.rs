use std::{
    sync::{Mutex, MutexGuard},
    time::SystemTime,
};

use threads_messages::{percent_decode, percent_encode};
use tracing::debug;

use super::backend::{KeyValueBackend, Origin, StorageError, WriteOptions};
use super::domain::is_public_suffix;

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    raw_value: String,
    domain: String,
    host_only: bool,
    path: String,
    expires_at: Option<SystemTime>,
    secure: bool,
}

impl StoredCookie {
    fn same_slot(&self, name: &str, domain: &str, host_only: bool, path: &str) -> bool {
        self.name == name && self.domain == domain && self.host_only == host_only && self.path == path
    }

    fn visible_to(&self, origin: &Origin, now: SystemTime) -> bool {
        let Some(host) = origin.host() else {
            return false;
        };
        if self.expires_at.is_some_and(|at| at <= now) {
            return false;
        }
        if self.secure && !origin.secure {
            return false;
        }
        if self.host_only {
            host == self.domain
        } else {
            domain_matches(host, &self.domain)
        }
    }
}

/// In-memory cookie jar with browser acceptance rules for `Domain`.
///
/// Values are percent-encoded on write and decoded on read. A `Domain`
/// attribute is dropped silently when the page host is an IP literal, the
/// domain is single-label or a public suffix, or the host is outside it.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: Mutex<Vec<StoredCookie>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `raw_value` verbatim as a host-only cookie for `host`.
    pub fn insert_raw(&self, host: &str, name: &str, raw_value: &str) {
        let host = host.to_ascii_lowercase();
        let mut cookies = self.lock();
        cookies.retain(|cookie| !cookie.same_slot(name, &host, true, "/"));
        cookies.push(StoredCookie {
            name: name.to_string(),
            raw_value: raw_value.to_string(),
            domain: host,
            host_only: true,
            path: "/".to_string(),
            expires_at: None,
            secure: false,
        });
    }

    /// Number of live cookies across every domain.
    pub fn len(&self) -> usize {
        let now = SystemTime::now();
        self.lock()
            .iter()
            .filter(|cookie| cookie.expires_at.map_or(true, |at| at > now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredCookie>> {
        self.cookies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Resolves the `(domain, host_only)` slot for a write, or `None` if refused.
fn accept_domain(origin: &Origin, requested: Option<&str>) -> Option<(String, bool)> {
    let host = origin.host()?;
    let requested = requested
        .map(|domain| domain.trim_start_matches('.').to_ascii_lowercase())
        .filter(|domain| !domain.is_empty());
    let Some(domain) = requested else {
        return Some((host.to_string(), true));
    };
    if origin.is_ip_literal() || !domain.contains('.') || is_public_suffix(&domain) {
        return None;
    }
    domain_matches(host, &domain).then_some((domain, false))
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

impl KeyValueBackend for CookieJar {
    fn get(&self, origin: &Origin, key: &str) -> Result<Option<String>, StorageError> {
        let now = SystemTime::now();
        let raw = self
            .lock()
            .iter()
            .rev()
            .find(|cookie| cookie.name == key && cookie.visible_to(origin, now))
            .map(|cookie| cookie.raw_value.clone());
        raw.map(|raw| {
            percent_decode(&raw).map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    fn set(
        &self,
        origin: &Origin,
        key: &str,
        value: Option<&str>,
        options: &WriteOptions,
    ) -> Result<(), StorageError> {
        let Some((domain, host_only)) = accept_domain(origin, options.domain.as_deref()) else {
            debug!(key, domain = ?options.domain, host = ?origin.host(), "cookie domain refused");
            return Ok(());
        };

        let mut cookies = self.lock();
        cookies.retain(|cookie| !cookie.same_slot(key, &domain, host_only, &options.path));
        if let Some(value) = value {
            cookies.push(StoredCookie {
                name: key.to_string(),
                raw_value: percent_encode(value),
                domain,
                host_only,
                path: options.path.clone(),
                expires_at: SystemTime::now().checked_add(options.max_age),
                secure: options.secure,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn origin(href: &str) -> Origin {
        Origin::from_href(href)
    }

    fn with_domain(domain: &str) -> WriteOptions {
        WriteOptions::persistent(Some(domain.to_string()))
    }

    #[test]
    fn domain_cookie_is_shared_across_subdomains() {
        let jar = CookieJar::new();
        let www = origin("https://www.example.com/");
        jar.set(&www, "k", Some("v"), &with_domain(".example.com"))
            .unwrap();

        let api = origin("https://api.example.com/");
        assert_eq!(jar.get(&api, "k").unwrap().as_deref(), Some("v"));
        assert_eq!(jar.get(&origin("https://example.org/"), "k").unwrap(), None);
    }

    #[test]
    fn unacceptable_domains_are_dropped_silently() {
        let jar = CookieJar::new();
        let cases = [
            ("http://127.0.0.1:3000/", ".127.0.0.1"),
            ("https://dev:300/path", ".dev"),
            ("https://app.herokuapp.com/", ".herokuapp.com"),
            ("https://www.example.com/", ".example.org"),
            ("https://www.example.com/", ".com"),
        ];
        for (href, domain) in cases {
            let page = origin(href);
            jar.set(&page, "k", Some("v"), &with_domain(domain)).unwrap();
            assert_eq!(jar.get(&page, "k").unwrap(), None, "{href} {domain}");
        }
        assert!(jar.is_empty());
    }

    #[test]
    fn host_only_cookie_works_on_any_named_host() {
        let jar = CookieJar::new();
        for href in ["https://dev:300/path", "http://127.0.0.1:3000/", "http://localhost/"] {
            let page = origin(href);
            jar.set(&page, "k", Some("v"), &WriteOptions::persistent(None))
                .unwrap();
            assert_eq!(jar.get(&page, "k").unwrap().as_deref(), Some("v"), "{href}");
        }
    }

    #[test]
    fn pages_without_host_have_no_cookies() {
        let jar = CookieJar::new();
        let page = origin("file:///tmp/index.html");
        jar.set(&page, "k", Some("v"), &WriteOptions::persistent(None))
            .unwrap();
        assert_eq!(jar.get(&page, "k").unwrap(), None);
    }

    #[test]
    fn clearing_removes_the_matching_slot() {
        let jar = CookieJar::new();
        let page = origin("https://www.example.com/");
        let options = with_domain(".example.com");
        jar.set(&page, "k", Some("v"), &options).unwrap();
        jar.set(&page, "k", None, &options).unwrap();
        assert_eq!(jar.get(&page, "k").unwrap(), None);
    }

    #[test]
    fn expired_cookies_are_invisible() {
        let jar = CookieJar::new();
        let page = origin("http://localhost/");
        let options = WriteOptions {
            max_age: Duration::ZERO,
            ..WriteOptions::persistent(None)
        };
        jar.set(&page, "k", Some("v"), &options).unwrap();
        assert_eq!(jar.get(&page, "k").unwrap(), None);
        assert_eq!(jar.len(), 0);
    }

    #[test]
    fn secure_cookies_need_a_secure_page() {
        let jar = CookieJar::new();
        let options = WriteOptions {
            secure: true,
            ..WriteOptions::persistent(None)
        };
        jar.set(&origin("https://localhost/"), "k", Some("v"), &options)
            .unwrap();
        assert_eq!(jar.get(&origin("http://localhost/"), "k").unwrap(), None);
        assert!(jar.get(&origin("https://localhost/"), "k").unwrap().is_some());
    }

    #[test]
    fn values_are_percent_encoded_at_rest() {
        let jar = CookieJar::new();
        let page = origin("http://localhost/");
        let json = r#"{"id":"medium","type":"millennial-media"}"#;
        jar.set(&page, "k", Some(json), &WriteOptions::persistent(None))
            .unwrap();
        assert_eq!(jar.get(&page, "k").unwrap().as_deref(), Some(json));
    }

    #[test]
    fn malformed_raw_value_is_a_decode_error() {
        let jar = CookieJar::new();
        jar.insert_raw("localhost", "bad", "%");
        let page = origin("http://localhost/");
        assert!(matches!(
            jar.get(&page, "bad"),
            Err(StorageError::Decode { .. })
        ));
        jar.set(&page, "good", Some("ok"), &WriteOptions::persistent(None))
            .unwrap();
        assert_eq!(jar.get(&page, "good").unwrap().as_deref(), Some("ok"));
    }
}
