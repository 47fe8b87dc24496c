//! Persistence for referrer attribution.
//!
//! [`AttributionStore`] owns the policy: pick cookies or local storage from
//! the page scheme, scope cookies to the registrable domain, verify each write
//! and retry host-only when a domain-scoped write does not stick. The
//! [`CookieJar`] and [`LocalStorage`] backends are plain key/value primitives.

mod backend;
mod cookie;
mod domain;
mod local;
mod store;

pub use backend::{
    is_ip_literal, select_backend, BackendKind, KeyValueBackend, Origin, StorageError,
    WriteOptions, DEFAULT_MAX_AGE,
};
pub use cookie::CookieJar;
pub use domain::{is_public_suffix, registrable_domain};
pub use local::LocalStorage;
pub use store::{AttributionStore, REFERRER_KEY};
