#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::Value;
use threads::{
    DeliveryRequest, MemoryHost, StaticEnvironment, ThreadsClient, Transport, TransportError,
    TransportFuture, TransportResponse,
};
use tokio::sync::mpsc;

pub const EVENT_KEY: &str = "cbd66709f885fb345ba258fa3f7660d297a009255950adcf";

enum Reply {
    Status(u16, String),
    Fail(String),
}

/// Records every request and answers with a canned reply.
pub struct RecordingTransport {
    reply: Reply,
    requests: Mutex<Vec<DeliveryRequest>>,
    sent: mpsc::UnboundedSender<DeliveryRequest>,
}

impl RecordingTransport {
    pub fn ok() -> (Arc<Self>, mpsc::UnboundedReceiver<DeliveryRequest>) {
        Self::with_reply(Reply::Status(200, r#"{"success":true}"#.to_string()))
    }

    pub fn status(status: u16, body: &str) -> (Arc<Self>, mpsc::UnboundedReceiver<DeliveryRequest>) {
        Self::with_reply(Reply::Status(status, body.to_string()))
    }

    pub fn failing(message: &str) -> (Arc<Self>, mpsc::UnboundedReceiver<DeliveryRequest>) {
        Self::with_reply(Reply::Fail(message.to_string()))
    }

    fn with_reply(reply: Reply) -> (Arc<Self>, mpsc::UnboundedReceiver<DeliveryRequest>) {
        let (sent, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
            sent,
        });
        (transport, rx)
    }

    pub fn requests(&self) -> Vec<DeliveryRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Transport for RecordingTransport {
    fn post(&self, request: DeliveryRequest) -> TransportFuture<'_> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        let _ = self.sent.send(request);
        let result = match &self.reply {
            Reply::Status(status, body) => Ok(TransportResponse {
                status: *status,
                body: body.clone(),
            }),
            Reply::Fail(message) => Err(TransportError::Other(message.clone())),
        };
        Box::pin(async move { result })
    }
}

pub struct Harness {
    pub client: ThreadsClient,
    pub env: Arc<StaticEnvironment>,
    pub host: Arc<MemoryHost>,
    pub transport: Arc<RecordingTransport>,
    pub sent: mpsc::UnboundedReceiver<DeliveryRequest>,
}

pub fn harness(href: &str) -> Harness {
    let (transport, sent) = RecordingTransport::ok();
    harness_with(href, transport, sent)
}

pub fn harness_with(
    href: &str,
    transport: Arc<RecordingTransport>,
    sent: mpsc::UnboundedReceiver<DeliveryRequest>,
) -> Harness {
    let env = Arc::new(StaticEnvironment::new(href).with_user_agent("test-agent"));
    let host = Arc::new(MemoryHost::new());
    host.set_anonymous_id("anon-id");
    let client = ThreadsClient::builder()
        .event_key(EVENT_KEY)
        .input_host("input.threads.io")
        .environment(env.clone())
        .host(host.clone())
        .transport(transport.clone())
        .build()
        .expect("build client");
    Harness {
        client,
        env,
        host,
        transport,
        sent,
    }
}

pub fn body(request: &DeliveryRequest) -> Value {
    serde_json::from_str(&request.body).expect("request body is JSON")
}

pub fn object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}
