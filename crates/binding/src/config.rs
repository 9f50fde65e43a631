//! Client configuration.
//!
//! [`ClientConfig`] holds everything a generated client needs besides its
//! collaborators: the base URL, how non-success statuses are treated, headers
//! sent on every request, and whether descriptors resolve eagerly.
//!
//! All types deserialise from configuration records, and validation happens
//! during deserialisation or construction, never at call time.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

// ---------------------------------------------------------------------------
// Base URL
// ---------------------------------------------------------------------------

/// An absolute `http` or `https` URL prefixed to every path template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Validates and wraps `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless `url` starts with
    /// `http://` or `https://` followed by a host.
    pub fn parse(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let valid = matches!(
            url.strip_prefix("https://").or_else(|| url.strip_prefix("http://")),
            Some(host) if !host.is_empty() && !host.starts_with('/')
        );
        if valid {
            Ok(Self(url))
        } else {
            Err(ConfigError::InvalidBaseUrl { url })
        }
    }

    /// Returns the URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BaseUrl {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<BaseUrl> for String {
    fn from(value: BaseUrl) -> Self {
        value.0
    }
}

impl std::fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Status handling
// ---------------------------------------------------------------------------

/// How responses with a non-2xx status are surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Non-2xx responses fail the call with [`crate::InvocationError::Status`].
    #[default]
    FailOnError,
    /// Every response is adapted normally; the body is decoded regardless of status.
    PassThrough,
}

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Configuration of one generated client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix for every path template.
    pub base_url: BaseUrl,

    /// Treatment of non-success statuses.
    #[serde(default)]
    pub status_policy: StatusPolicy,

    /// Headers sent on every request, before method-specific headers.
    #[serde(default)]
    pub default_headers: Vec<(String, String)>,

    /// Resolve every endpoint descriptor when the client is built instead of
    /// on each method's first call.
    #[serde(default)]
    pub eager_resolution: bool,
}

impl ClientConfig {
    /// Creates a configuration with default settings for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `base_url` is not absolute.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: BaseUrl::parse(base_url)?,
            status_policy: StatusPolicy::default(),
            default_headers: Vec::new(),
            eager_resolution: false,
        })
    }

    /// Sets the status policy.
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Adds a header sent on every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Enables or disables eager descriptor resolution.
    pub fn with_eager_resolution(mut self, eager: bool) -> Self {
        self.eager_resolution = eager;
        self
    }

    /// Checks the parts of the configuration that deserialisation cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeader`] for an empty header name or one
    /// containing whitespace or `:`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, _) in &self.default_headers {
            if !is_valid_header_name(name) {
                return Err(ConfigError::InvalidHeader { name: name.clone() });
            }
        }
        Ok(())
    }
}

pub(crate) fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c == ':')
}
