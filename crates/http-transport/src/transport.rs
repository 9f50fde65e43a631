//! [`Transport`] over a pooled `reqwest` client.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use binding::{
    ConfigError, HttpMethod, RequestTemplate, Transport, TransportError, TransportResponse,
};
use tracing::{debug, info};

use crate::HttpTransportConfig;

/// Sends [`RequestTemplate`]s over HTTP/1.1 or HTTP/2 with connection reuse.
///
/// [`Transport::shutdown`] drops the pooled client; later sends fail with
/// [`TransportError::Connection`].
#[derive(Debug)]
pub struct ReqwestTransport {
    client: RwLock<Option<reqwest::Client>>,
}

impl ReqwestTransport {
    /// Builds a transport with its own connection pool.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Transport`] if the HTTP client cannot be initialised,
    /// e.g. because the user agent is not a valid header value.
    pub fn new(config: &HttpTransportConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().map_err(|e| ConfigError::Transport {
            message: e.to_string(),
        })?;
        Ok(Self::from_client(client))
    }

    /// Wraps an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    /// Returns `true` once the pooled client has been released.
    pub fn is_shut_down(&self) -> bool {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn pooled_client(&self) -> Result<reqwest::Client, TransportError> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| TransportError::Connection {
                message: "transport shut down".to_owned(),
            })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestTemplate) -> Result<TransportResponse, TransportError> {
        let client = self.pooled_client()?;
        let (method, url, headers, body) = request.into_parts();

        let mut builder = client.request(to_reqwest_method(method), url.as_str());
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let body = response.bytes().await.map_err(map_error)?;
        debug!(%url, status, bytes = body.len(), "response received");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    async fn shutdown(&self) {
        let released = self
            .client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        // In-flight sends hold their own handle; idle pooled connections close
        // once those finish.
        if released.is_some() {
            info!("http transport released");
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

fn map_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connection {
            message: error.to_string(),
        }
    } else {
        TransportError::Protocol {
            message: error.to_string(),
        }
    }
}
