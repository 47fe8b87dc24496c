use std::sync::Arc;

use serde_json::{Map, Value};
use threads_messages::{
    merge_object, parse_ad_attribution, parse_campaign, truthy, AttributionRecord, Fields,
    Library, UserIdentity,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::environment::Environment;
use crate::storage::AttributionStore;

/// Enriches routed message fields into the collector payload.
pub struct Normalizer {
    event_key: String,
    environment: Arc<dyn Environment>,
    store: Arc<AttributionStore>,
    fallback_anonymous_id: String,
}

impl Normalizer {
    pub fn new(
        event_key: impl Into<String>,
        environment: Arc<dyn Environment>,
        store: Arc<AttributionStore>,
    ) -> Self {
        Self {
            event_key: event_key.into(),
            environment,
            store,
            fallback_anonymous_id: Uuid::new_v4().to_string(),
        }
    }

    /// Gives a user without an anonymous id this normalizer's stable one.
    pub fn resolve_user(&self, user: UserIdentity) -> UserIdentity {
        user.or_anonymous_id(|| self.fallback_anonymous_id.clone())
    }

    /// Adds `eventKey`, identity, ids and `context` metadata to `fields`.
    ///
    /// An existing `context` is kept and, when it is an object, extended;
    /// otherwise `options` becomes the context. `options` never survives.
    /// `anonymousId` and `messageId` are always overwritten, an explicit
    /// `userId` never is.
    pub fn normalize(&self, mut fields: Fields, user: &UserIdentity, library: &Library) -> Fields {
        debug!(?fields, "normalize");
        let search = self.environment.search();

        let options = fields.remove("options");
        let context = match fields.remove("context") {
            None | Some(Value::Null) => match options {
                Some(Value::Object(options)) => Value::Object(options),
                _ => Value::Object(Map::new()),
            },
            Some(existing) => existing,
        };

        fields.insert("eventKey".to_string(), Value::from(self.event_key.as_str()));

        let referrer = self.resolve_referrer(&search);
        let context = match context {
            Value::Object(mut context) => {
                self.enrich_context(&mut context, &search, library);
                if let Some(record) = referrer {
                    merge_object(&mut context, "referrer", record.to_object());
                }
                Value::Object(context)
            }
            other => {
                debug!(context = ?other, "leaving non-object context untouched");
                other
            }
        };
        fields.insert("context".to_string(), context);

        let user_id = truthy(fields.get("userId"))
            .cloned()
            .or_else(|| user.id().map(Value::from));
        match user_id {
            Some(user_id) => {
                fields.insert("userId".to_string(), user_id);
            }
            None => {
                fields.remove("userId");
            }
        }
        let anonymous_id = if user.anonymous_id.is_empty() {
            self.fallback_anonymous_id.as_str()
        } else {
            user.anonymous_id.as_str()
        };
        fields.insert("anonymousId".to_string(), Value::from(anonymous_id));
        fields.insert(
            "messageId".to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );

        debug!(?fields, "normalized");
        fields
    }

    fn enrich_context(&self, context: &mut Fields, search: &str, library: &Library) {
        context.insert(
            "userAgent".to_string(),
            Value::String(self.environment.user_agent()),
        );
        if truthy(context.get("library")).is_none() {
            match serde_json::to_value(library) {
                Ok(value) => {
                    context.insert("library".to_string(), value);
                }
                Err(err) => warn!(%err, "failed to encode library metadata"),
            }
        }
        if !search.is_empty() {
            if let Some(campaign) = parse_campaign(search) {
                match serde_json::to_value(&campaign) {
                    Ok(value) => {
                        context.insert("campaign".to_string(), value);
                    }
                    Err(err) => warn!(%err, "failed to encode campaign"),
                }
            }
        }
    }

    /// Ad parameters in the query string win over the stored record; the
    /// winner is persisted whenever it differs from what was stored.
    fn resolve_referrer(&self, search: &str) -> Option<AttributionRecord> {
        let stored = self.store.read_attribution();
        let fresh = if search.is_empty() {
            None
        } else {
            parse_ad_attribution(search)
        };

        let winner = fresh.or_else(|| stored.clone())?;
        if stored.as_ref() != Some(&winner) {
            self.store.write_attribution(&winner);
        }
        Some(winner)
    }
}
