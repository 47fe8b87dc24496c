use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The page the adapter runs in: location parts and the user agent.
///
/// Read on every call, never cached, so the same client follows navigation.
pub trait Environment: Send + Sync {
    /// Full page URL.
    fn href(&self) -> String;
    /// Query string including the leading `?`, or empty.
    fn search(&self) -> String;
    /// Scheme with trailing colon, e.g. `https:` or `file:`.
    fn protocol(&self) -> String;
    fn user_agent(&self) -> String;
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct Location {
    href: String,
    search: String,
    protocol: String,
}

impl Location {
    fn parse(href: &str) -> Self {
        let protocol = href
            .split_once(':')
            .map(|(scheme, _)| format!("{}:", scheme.to_ascii_lowercase()))
            .unwrap_or_default();
        let without_fragment = href.split_once('#').map_or(href, |(head, _)| head);
        let search = without_fragment
            .find('?')
            .map(|idx| without_fragment[idx..].to_string())
            .filter(|search| search.len() > 1)
            .unwrap_or_default();
        Self {
            href: href.to_string(),
            search,
            protocol,
        }
    }
}

/// An [`Environment`] whose values are set explicitly and can be changed later.
#[derive(Debug)]
pub struct StaticEnvironment {
    location: RwLock<Location>,
    user_agent: RwLock<String>,
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        Self::new("http://localhost/")
    }
}

impl StaticEnvironment {
    pub fn new(href: impl AsRef<str>) -> Self {
        Self {
            location: RwLock::new(Location::parse(href.as_ref())),
            user_agent: RwLock::new(default_user_agent()),
        }
    }

    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        self.set_user_agent(user_agent);
        self
    }

    /// Navigates: `search` and `protocol` are re-derived from `href`.
    pub fn set_href(&self, href: impl AsRef<str>) {
        *self.location_mut() = Location::parse(href.as_ref());
    }

    /// Overrides only the query string, leaving `href` alone.
    pub fn set_search(&self, search: impl Into<String>) {
        self.location_mut().search = search.into();
    }

    /// Overrides only the scheme, e.g. to emulate a packaged app.
    pub fn set_protocol(&self, protocol: impl Into<String>) {
        self.location_mut().protocol = protocol.into();
    }

    pub fn set_user_agent(&self, user_agent: impl Into<String>) {
        *self
            .user_agent
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = user_agent.into();
    }

    fn location(&self) -> RwLockReadGuard<'_, Location> {
        self.location
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn location_mut(&self) -> RwLockWriteGuard<'_, Location> {
        self.location
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Environment for StaticEnvironment {
    fn href(&self) -> String {
        self.location().href.clone()
    }

    fn search(&self) -> String {
        self.location().search.clone()
    }

    fn protocol(&self) -> String {
        self.location().protocol.clone()
    }

    fn user_agent(&self) -> String {
        self.user_agent
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

fn default_user_agent() -> String {
    format!("threads-rs/{}", env!("CARGO_PKG_VERSION"))
}
