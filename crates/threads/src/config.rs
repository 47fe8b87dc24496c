use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults::default_input_host;
use crate::ThreadsError;

/// Integration settings as the host hands them over.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreadsConfig {
    /// Vendor credential stamped on every payload as `eventKey`.
    pub event_key: String,
    /// Collector host; requests go to `https://{input_host}/v1/...`.
    pub input_host: String,
}

impl Default for ThreadsConfig {
    fn default() -> Self {
        Self {
            event_key: String::new(),
            input_host: default_input_host(),
        }
    }
}

impl ThreadsConfig {
    /// Reads a settings object such as `{"eventKey": "...", "inputHost": "..."}`.
    /// Unknown keys are ignored and missing ones take their defaults.
    pub fn from_settings(settings: Value) -> Result<Self, ThreadsError> {
        serde_json::from_value(settings).map_err(ThreadsError::InvalidSettings)
    }

    /// Destination for an endpoint path such as `/i`. Always `https`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("https://{}/v1{}", self.input_host, path)
    }
}
