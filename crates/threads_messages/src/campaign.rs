use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::query::parse_query;

const UTM_PREFIX: &str = "utm_";

/// UTM campaign parameters, keyed the way the collector expects them.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Collects every `utm_*` parameter of `search`; `None` when there are none.
///
/// `utm_campaign` is reported as `name`; a literal `utm_name` only fills
/// `name` when `utm_campaign` is absent. Later duplicates override earlier ones.
pub fn parse_campaign(search: &str) -> Option<Campaign> {
    let mut campaign = Campaign::default();
    let mut utm_name = None;
    let mut found = false;

    for (key, value) in parse_query(search) {
        let Some(field) = key.strip_prefix(UTM_PREFIX) else {
            continue;
        };
        if field.is_empty() {
            continue;
        }
        found = true;
        match field {
            "campaign" => campaign.name = Some(value),
            "source" => campaign.source = Some(value),
            "medium" => campaign.medium = Some(value),
            "term" => campaign.term = Some(value),
            "content" => campaign.content = Some(value),
            "name" => utm_name = Some(value),
            other => {
                campaign.extra.insert(other.to_string(), value);
            }
        }
    }

    if campaign.name.is_none() {
        campaign.name = utm_name;
    }
    found.then_some(campaign)
}
