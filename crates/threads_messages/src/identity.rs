use serde::{Deserialize, Serialize};

/// The host's current user, as seen at the moment a message is normalized.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UserIdentity {
    pub id: Option<String>,
    pub anonymous_id: String,
}

impl UserIdentity {
    pub fn anonymous(anonymous_id: impl Into<String>) -> Self {
        Self {
            id: None,
            anonymous_id: anonymous_id.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replaces an empty anonymous id with `fallback()`.
    pub fn or_anonymous_id(mut self, fallback: impl FnOnce() -> String) -> Self {
        if self.anonymous_id.is_empty() {
            self.anonymous_id = fallback();
        }
        self
    }

    /// The user id, ignoring empty strings.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// `context.library` as reported to the collector.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    pub version: String,
}

impl Library {
    pub const DEFAULT_NAME: &'static str = "analytics.js";

    pub fn new(version: impl Into<String>) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            version: version.into(),
        }
    }
}
