//! Shared fixtures: an in-memory transport that records every request and a
//! minimal JSON codec.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use binding::{
    BodyCodec, ClientConfig, CodecError, RequestTemplate, Transport, TransportError,
    TransportResponse,
};
use bytes::Bytes;
use dispatch::{ClientBuilder, ServiceClient};
use serde_json::Value;

type Responder =
    dyn Fn(&RequestTemplate) -> Result<TransportResponse, TransportError> + Send + Sync;

pub struct RecordingTransport {
    requests: Mutex<Vec<RequestTemplate>>,
    responder: Box<Responder>,
    shutdowns: AtomicUsize,
}

impl RecordingTransport {
    /// Answers every request with `200` and `body`.
    pub fn replying(body: &'static str) -> Arc<Self> {
        Self::with(move |_| Ok(TransportResponse::new(200, body)))
    }

    pub fn with<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&RequestTemplate) -> Result<TransportResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            shutdowns: AtomicUsize::new(0),
        })
    }

    pub fn requests(&self) -> Vec<RequestTemplate> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> RequestTemplate {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn sent(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: RequestTemplate) -> Result<TransportResponse, TransportError> {
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct TestJsonCodec;

impl BodyCodec for TestJsonCodec {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn encode(&self, value: &Value) -> Result<Bytes, CodecError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode {
                message: e.to_string(),
            })
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            message: e.to_string(),
        })
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new("https://localhost/").unwrap()
}

pub fn builder(transport: &Arc<RecordingTransport>) -> ClientBuilder {
    builder_with(config(), transport)
}

pub fn builder_with(config: ClientConfig, transport: &Arc<RecordingTransport>) -> ClientBuilder {
    ServiceClient::builder(config, transport.clone(), Arc::new(TestJsonCodec))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
