use std::{fmt, sync::Arc, time::Duration};

use crate::{
    client::ThreadsClient,
    config::ThreadsConfig,
    defaults::DEFAULT_TIMEOUT,
    environment::{Environment, StaticEnvironment},
    host::{Host, MemoryHost},
    normalize::Normalizer,
    storage::{AttributionStore, CookieJar, KeyValueBackend, LocalStorage},
    transport::{HttpTransport, Transport},
    ThreadsError,
};

#[derive(Clone)]
pub struct ThreadsClientBuilder {
    pub(crate) config: ThreadsConfig,
    pub(crate) timeout: Option<Duration>,
    pub(crate) environment: Option<Arc<dyn Environment>>,
    pub(crate) host: Option<Arc<dyn Host>>,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) cookie_jar: Option<Arc<dyn KeyValueBackend>>,
    pub(crate) local_storage: Option<Arc<dyn KeyValueBackend>>,
}

impl Default for ThreadsClientBuilder {
    fn default() -> Self {
        Self {
            config: ThreadsConfig::default(),
            timeout: Some(DEFAULT_TIMEOUT),
            environment: None,
            host: None,
            transport: None,
            cookie_jar: None,
            local_storage: None,
        }
    }
}

impl fmt::Debug for ThreadsClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadsClientBuilder")
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .field("custom_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

impl ThreadsClientBuilder {
    /// Replaces the whole configuration, e.g. one read with [`ThreadsConfig::from_settings`].
    pub fn config(mut self, config: ThreadsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn event_key(mut self, event_key: impl Into<String>) -> Self {
        self.config.event_key = event_key.into();
        self
    }

    pub fn input_host(mut self, input_host: impl Into<String>) -> Self {
        self.config.input_host = input_host.into();
        self
    }

    /// Request timeout for the default HTTP transport. `None` disables it.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn environment<E: Environment + 'static>(mut self, environment: Arc<E>) -> Self {
        let environment: Arc<dyn Environment> = environment;
        self.environment = Some(environment);
        self
    }

    pub fn host<H: Host + 'static>(mut self, host: Arc<H>) -> Self {
        let host: Arc<dyn Host> = host;
        self.host = Some(host);
        self
    }

    /// Overrides the HTTP transport; the timeout setting is then ignored.
    pub fn transport<T: Transport + 'static>(mut self, transport: Arc<T>) -> Self {
        let transport: Arc<dyn Transport> = transport;
        self.transport = Some(transport);
        self
    }

    pub fn cookie_jar<B: KeyValueBackend + 'static>(mut self, cookie_jar: Arc<B>) -> Self {
        let cookie_jar: Arc<dyn KeyValueBackend> = cookie_jar;
        self.cookie_jar = Some(cookie_jar);
        self
    }

    pub fn local_storage<B: KeyValueBackend + 'static>(mut self, local_storage: Arc<B>) -> Self {
        let local_storage: Arc<dyn KeyValueBackend> = local_storage;
        self.local_storage = Some(local_storage);
        self
    }

    pub fn build(self) -> Result<ThreadsClient, ThreadsError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.timeout)?),
        };
        let environment: Arc<dyn Environment> = match self.environment {
            Some(environment) => environment,
            None => Arc::new(StaticEnvironment::default()),
        };
        let host: Arc<dyn Host> = match self.host {
            Some(host) => host,
            None => Arc::new(MemoryHost::new()),
        };
        let cookies: Arc<dyn KeyValueBackend> = match self.cookie_jar {
            Some(cookies) => cookies,
            None => Arc::new(CookieJar::new()),
        };
        let local: Arc<dyn KeyValueBackend> = match self.local_storage {
            Some(local) => local,
            None => Arc::new(LocalStorage::in_memory()),
        };

        let store = Arc::new(AttributionStore::new(environment.clone(), cookies, local));
        let normalizer = Arc::new(Normalizer::new(
            self.config.event_key.clone(),
            environment.clone(),
            store.clone(),
        ));

        Ok(ThreadsClient {
            config: Arc::new(self.config),
            host,
            environment,
            store,
            normalizer,
            transport,
        })
    }
}
