use std::{future::Future, pin::Pin, time::Duration};

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use crate::ThreadsError;

/// The collector parses bodies itself; a JSON content type breaks it.
pub const CONTENT_TYPE_TEXT_PLAIN: &str = "text/plain";

/// A fully built POST: destination, content type and serialized body.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeliveryRequest {
    pub url: String,
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>>;

/// Sends one request and yields whatever the server answered.
///
/// Non-2xx statuses are responses, not errors; only failing to exchange a
/// request at all is a [`TransportError`].
pub trait Transport: Send + Sync {
    fn post(&self, request: DeliveryRequest) -> TransportFuture<'_>;
}

/// [`Transport`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, ThreadsError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout.filter(|timeout| !timeout.is_zero()) {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ThreadsError::HttpClient)?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: DeliveryRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let response = self
                .client
                .post(&request.url)
                .header(CONTENT_TYPE, request.content_type)
                .body(request.body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(TransportResponse { status, body })
        })
    }
}
