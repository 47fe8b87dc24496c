use threads_messages::Message;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

use crate::client::ThreadsClient;

/// Subscribes a [`ThreadsClient`] to the host's stream of analytics calls.
#[derive(Debug, Clone)]
pub struct Integration {
    client: ThreadsClient,
}

impl Integration {
    pub const NAME: &'static str = "Threads";

    pub fn new(client: ThreadsClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ThreadsClient {
        &self.client
    }

    /// Nothing is fetched at startup, so the integration is always loaded.
    pub fn loaded(&self) -> bool {
        true
    }

    /// Dispatches one message and signals readiness for the next.
    pub fn invoke(&self, message: Message) -> JoinHandle<()> {
        debug!(kind = %message.kind(), ?message, "invoke");
        let handle = self.client.dispatch(message);
        self.client.host().ready();
        handle
    }

    /// Signals readiness, then dispatches messages until the sender is dropped.
    pub async fn run(self, mut messages: mpsc::UnboundedReceiver<Message>) {
        self.client.host().ready();
        while let Some(message) = messages.recv().await {
            self.invoke(message);
        }
        debug!("invoke stream closed");
    }

    pub fn spawn(self, messages: mpsc::UnboundedReceiver<Message>) -> JoinHandle<()> {
        tokio::spawn(self.run(messages))
    }
}
