use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::parse_query;

/// Query keys that identify an ad network click, paired with the referrer type.
pub const AD_PARAMETERS: &[(&str, &str)] = &[("btid", "dataxu"), ("urid", "millennial-media")];

/// Referrer attribution: which ad network sent the visitor, and its click id.
///
/// Stored records may carry extra tag fields; they survive a round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttributionRecord {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            extra: Map::new(),
        }
    }

    /// Parses the persisted form. Anything that is not a record reads as `None`.
    pub fn from_stored(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn to_stored(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_object(&self) -> Map<String, Value> {
        let mut object = self.extra.clone();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        object.insert("type".to_string(), Value::String(self.kind.clone()));
        object
    }
}

/// Returns the first recognised ad parameter of `search`, in query order.
pub fn parse_ad_attribution(search: &str) -> Option<AttributionRecord> {
    parse_query(search).into_iter().find_map(|(key, value)| {
        AD_PARAMETERS
            .iter()
            .find(|(param, _)| *param == key)
            .map(|(_, kind)| AttributionRecord::new(value, *kind))
    })
}
