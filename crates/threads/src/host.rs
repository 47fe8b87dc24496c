use std::sync::{
    atomic::{AtomicUsize, Ordering},
    RwLock,
};

use threads_messages::{Library, UserIdentity};
use uuid::Uuid;

/// The analytics framework hosting the integration.
///
/// The host owns user identity; the integration only reads it.
pub trait Host: Send + Sync {
    fn user(&self) -> UserIdentity;

    fn library(&self) -> Library {
        Library::new(env!("CARGO_PKG_VERSION"))
    }

    /// Signals that the integration can take the next message.
    fn ready(&self) {}
}

/// A self-contained [`Host`] keeping identity in memory.
///
/// A random anonymous id is minted on construction.
#[derive(Debug)]
pub struct MemoryHost {
    user: RwLock<UserIdentity>,
    library: Library,
    ready_signals: AtomicUsize,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            user: RwLock::new(UserIdentity::anonymous(new_anonymous_id())),
            library: Library::new(env!("CARGO_PKG_VERSION")),
            ready_signals: AtomicUsize::new(0),
        }
    }

    pub fn with_library(mut self, library: Library) -> Self {
        self.library = library;
        self
    }

    pub fn set_user_id(&self, id: Option<&str>) {
        self.user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .id = id.map(str::to_string);
    }

    /// An empty id is replaced with a freshly generated one.
    pub fn set_anonymous_id(&self, anonymous_id: impl Into<String>) {
        let user = UserIdentity::anonymous(anonymous_id).or_anonymous_id(new_anonymous_id);
        self.user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .anonymous_id = user.anonymous_id;
    }

    /// How many times [`Host::ready`] has been signalled.
    pub fn ready_count(&self) -> usize {
        self.ready_signals.load(Ordering::SeqCst)
    }
}

fn new_anonymous_id() -> String {
    Uuid::new_v4().to_string()
}

impl Host for MemoryHost {
    fn user(&self) -> UserIdentity {
        self.user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn library(&self) -> Library {
        self.library.clone()
    }

    fn ready(&self) {
        self.ready_signals.fetch_add(1, Ordering::SeqCst);
    }
}
