use std::{fmt, sync::Arc};

use serde_json::Value;
use threads_messages::{Fields, Message, UserIdentity};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    builder::ThreadsClientBuilder,
    config::ThreadsConfig,
    environment::Environment,
    host::Host,
    normalize::Normalizer,
    router::route,
    storage::AttributionStore,
    transport::{DeliveryRequest, Transport, CONTENT_TYPE_TEXT_PLAIN},
    ThreadsError,
};

/// What the collector answered to an accepted payload.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeliveryResponse {
    /// The destination the payload was posted to.
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl DeliveryResponse {
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Cheap to clone; every clone shares configuration, storage and transport.
#[derive(Clone)]
pub struct ThreadsClient {
    pub(crate) config: Arc<ThreadsConfig>,
    pub(crate) host: Arc<dyn Host>,
    pub(crate) environment: Arc<dyn Environment>,
    pub(crate) store: Arc<AttributionStore>,
    pub(crate) normalizer: Arc<Normalizer>,
    pub(crate) transport: Arc<dyn Transport>,
}

impl fmt::Debug for ThreadsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadsClient")
            .field("config", &self.config)
            .field("href", &self.environment.href())
            .finish_non_exhaustive()
    }
}

impl ThreadsClient {
    pub fn builder() -> ThreadsClientBuilder {
        ThreadsClientBuilder::default()
    }

    pub fn config(&self) -> &ThreadsConfig {
        &self.config
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn environment(&self) -> &Arc<dyn Environment> {
        &self.environment
    }

    pub fn store(&self) -> &AttributionStore {
        &self.store
    }

    /// `https://{input_host}/v1{path}`, whatever the page scheme.
    pub fn endpoint(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// The host's current identity, with an anonymous id guaranteed.
    pub fn user(&self) -> UserIdentity {
        self.normalizer.resolve_user(self.host.user())
    }

    /// Normalizes `fields` against the host's current identity.
    pub fn normalize(&self, fields: Fields) -> Fields {
        self.normalizer
            .normalize(fields, &self.user(), &self.host.library())
    }

    /// Normalizes and posts `fields` to `path`. No retries.
    pub async fn send(&self, path: &str, fields: Fields) -> Result<DeliveryResponse, ThreadsError> {
        let request = self.prepare(path, fields, &self.user());
        transmit(self.transport.as_ref(), request?).await
    }

    /// Normalizes `fields` now and spawns the post; `callback` runs once with
    /// the outcome.
    pub fn send_with<F>(&self, path: &str, fields: Fields, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<DeliveryResponse, ThreadsError>) + Send + 'static,
    {
        let request = self.prepare(path, fields, &self.user());
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            let result = match request {
                Ok(request) => transmit(transport.as_ref(), request).await,
                Err(err) => Err(err),
            };
            callback(result);
        })
    }

    /// Routes `message` to its endpoint and delivers it.
    pub async fn deliver(&self, message: Message) -> Result<DeliveryResponse, ThreadsError> {
        let request = self.prepare_message(message);
        transmit(self.transport.as_ref(), request?).await
    }

    /// Routes and normalizes `message` now, then posts it in the background.
    /// The outcome is only logged.
    pub fn dispatch(&self, message: Message) -> JoinHandle<()> {
        let kind = message.kind();
        let request = self.prepare_message(message);
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            let result = match request {
                Ok(request) => transmit(transport.as_ref(), request).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(response) => {
                    debug!(%kind, url = %response.url, status = response.status, "delivered")
                }
                Err(err) => warn!(%kind, %err, "delivery failed"),
            }
        })
    }

    fn prepare_message(&self, message: Message) -> Result<DeliveryRequest, ThreadsError> {
        let user = self.user();
        let routed = route(message, &user);
        self.prepare(routed.path, routed.fields, &user)
    }

    fn prepare(
        &self,
        path: &str,
        fields: Fields,
        user: &UserIdentity,
    ) -> Result<DeliveryRequest, ThreadsError> {
        let payload = self
            .normalizer
            .normalize(fields, user, &self.host.library());
        let body = serde_json::to_string(&payload).map_err(ThreadsError::Serialize)?;
        Ok(DeliveryRequest {
            url: self.endpoint(path),
            content_type: CONTENT_TYPE_TEXT_PLAIN,
            body,
        })
    }
}

async fn transmit(
    transport: &dyn Transport,
    request: DeliveryRequest,
) -> Result<DeliveryResponse, ThreadsError> {
    let url = request.url.clone();
    let response = transport
        .post(request)
        .await
        .map_err(|source| ThreadsError::Transport {
            url: url.clone(),
            source,
        })?;
    debug!(%url, status = response.status, "send");

    if !(200..300).contains(&response.status) {
        return Err(ThreadsError::Status {
            url,
            status: response.status,
            body: response.body,
        });
    }
    Ok(DeliveryResponse {
        url,
        status: response.status,
        body: response.body,
    })
}
