use std::sync::Arc;

use threads_messages::AttributionRecord;
use tracing::{debug, warn};

use super::backend::{select_backend, BackendKind, KeyValueBackend, Origin, WriteOptions};
use super::domain::registrable_domain;
use crate::environment::Environment;

/// Key under which the referrer attribution record is persisted.
pub const REFERRER_KEY: &str = "s:context.referrer";

/// Domain-scoped persistence for the referrer attribution record.
///
/// The backend is chosen from the page scheme on every call. Failures never
/// surface: unreadable values read as absent and refused writes are dropped.
pub struct AttributionStore {
    environment: Arc<dyn Environment>,
    cookies: Arc<dyn KeyValueBackend>,
    local: Arc<dyn KeyValueBackend>,
}

impl AttributionStore {
    pub fn new(
        environment: Arc<dyn Environment>,
        cookies: Arc<dyn KeyValueBackend>,
        local: Arc<dyn KeyValueBackend>,
    ) -> Self {
        Self {
            environment,
            cookies,
            local,
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        select_backend(&self.environment.protocol())
    }

    fn backend(&self) -> &dyn KeyValueBackend {
        match self.backend_kind() {
            BackendKind::Cookie => self.cookies.as_ref(),
            BackendKind::LocalStorage => self.local.as_ref(),
        }
    }

    pub fn read(&self, key: &str) -> Option<String> {
        let origin = Origin::from_href(&self.environment.href());
        self.read_from(self.backend(), &origin, key)
    }

    fn read_from(&self, backend: &dyn KeyValueBackend, origin: &Origin, key: &str) -> Option<String> {
        match backend.get(origin, key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "ignoring unreadable stored value");
                None
            }
        }
    }

    /// Writes (or with `None`, clears) `key` on the widest usable domain.
    ///
    /// The value is read back after writing; if the domain-scoped write did
    /// not stick, it is repeated without a `Domain` attribute.
    pub fn write(&self, key: &str, value: Option<&str>) {
        let href = self.environment.href();
        let origin = Origin::from_href(&href);
        let backend = self.backend();

        let site = registrable_domain(&origin, self.cookies.as_ref());
        let domain = (!site.is_empty()).then(|| format!(".{site}"));
        debug!(%href, ?domain, "store domain");

        let options = WriteOptions::persistent(domain);
        debug!(key, ?value, ?options, "store");
        if let Err(err) = backend.set(&origin, key, value, &options) {
            warn!(key, %err, "store write failed");
        }
        if self.read_from(backend, &origin, key).as_deref() == value {
            return;
        }

        let fallback = options.without_domain();
        debug!(key, ?value, ?fallback, "fallback store");
        if let Err(err) = backend.set(&origin, key, value, &fallback) {
            warn!(key, %err, "fallback store write failed");
        }
    }

    pub fn read_attribution(&self) -> Option<AttributionRecord> {
        let raw = self.read(REFERRER_KEY)?;
        let record = AttributionRecord::from_stored(&raw);
        if record.is_none() {
            debug!(%raw, "stored attribution is not a record");
        }
        record
    }

    pub fn write_attribution(&self, record: &AttributionRecord) {
        match record.to_stored() {
            Ok(raw) => self.write(REFERRER_KEY, Some(&raw)),
            Err(err) => warn!(%err, "failed to serialize attribution record"),
        }
    }

    pub fn clear_attribution(&self) {
        self.write(REFERRER_KEY, None);
    }
}
