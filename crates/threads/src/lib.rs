#![forbid(unsafe_code)]
//! Threads analytics adapter.
//!
//! Receives page, identify, group, track and alias calls from a host analytics
//! framework, enriches them with identity, campaign and referrer attribution,
//! and posts them to the Threads collector at `https://{inputHost}/v1/{p,i,g,t,a}`.
//!
//! Ambient browser state (location, user agent, cookies, local storage) is
//! injected through [`Environment`] and [`KeyValueBackend`], so the adapter runs
//! anywhere a tokio runtime does.

mod builder;
mod client;
mod config;
mod defaults;
mod environment;
mod error;
mod host;
mod integration;
mod normalize;
mod router;
pub mod storage;
mod transport;

pub use builder::ThreadsClientBuilder;
pub use client::{DeliveryResponse, ThreadsClient};
pub use config::ThreadsConfig;
pub use environment::{Environment, StaticEnvironment};
pub use error::ThreadsError;
pub use host::{Host, MemoryHost};
pub use integration::Integration;
pub use normalize::Normalizer;
pub use router::{endpoint, route, Routed};
pub use storage::{
    AttributionStore, BackendKind, CookieJar, KeyValueBackend, LocalStorage, Origin,
    StorageError, WriteOptions,
};
pub use transport::{
    DeliveryRequest, HttpTransport, Transport, TransportError, TransportFuture,
    TransportResponse, CONTENT_TYPE_TEXT_PLAIN,
};

pub use threads_messages::{
    AttributionRecord, Campaign, Fields, Library, Message, MessageKind, UserIdentity,
};
