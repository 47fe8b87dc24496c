#![forbid(unsafe_code)]
//! Message model shared by the Threads adapter.
//!
//! This crate performs no I/O. It provides:
//! - The five analytics call kinds as a tagged [`Message`] over raw JSON objects.
//! - Query-string helpers plus the UTM ([`parse_campaign`]) and ad-network
//!   ([`parse_ad_attribution`]) parsers used for attribution.
//! - The identity and library metadata types read during normalization.

mod attribution;
mod campaign;
mod error;
mod fields;
mod identity;
mod message;
mod query;

pub use attribution::{parse_ad_attribution, AttributionRecord, AD_PARAMETERS};
pub use campaign::{parse_campaign, Campaign};
pub use error::{DecodeError, MessageError};
pub use fields::{first_truthy, merge_object, truthy, Fields};
pub use identity::{Library, UserIdentity};
pub use message::{Message, MessageKind};
pub use query::{parse_query, percent_decode, percent_encode};
