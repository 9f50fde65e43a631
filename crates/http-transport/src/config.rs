//! Transport configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

fn default_timeout_ms() -> Option<u64> {
    Some(DEFAULT_TIMEOUT_MS)
}

fn default_connect_timeout_ms() -> Option<u64> {
    Some(DEFAULT_CONNECT_TIMEOUT_MS)
}

fn default_user_agent() -> String {
    concat!("courier/", env!("CARGO_PKG_VERSION")).to_owned()
}

/// Settings for [`crate::ReqwestTransport`].
///
/// Every field has a default, so an empty configuration record is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTransportConfig {
    /// Whole-request timeout in milliseconds. `None` disables it.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: Option<u64>,

    /// Connection establishment timeout in milliseconds. `None` disables it.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: Option<u64>,

    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpTransportConfig {
    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}
