//! HTTP transport for the statistics API
//!
//! The [`Transport`] trait is the seam between the report pipeline and the
//! network. Production uses [`HttpTransport`] (blocking `ureq` agent); tests
//! plug in scripted transports.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Headers the API requires; requests without them are rejected with 403.
pub const REQUIRED_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    ),
    ("Accept", "application/json"),
    ("Referer", "https://qedu.org.br/"),
];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One GET request returning a JSON document.
pub trait Transport: Send + Sync {
    fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, FetchError>;
}

/// Blocking HTTP transport backed by a shared `ureq` agent.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
        let mut request = self.agent.get(url);
        for (name, value) in REQUIRED_HEADERS {
            request = request.set(name, value);
        }
        for (name, value) in params {
            request = request.query(name, value);
        }

        let response = request.call().map_err(|e| match e {
            ureq::Error::Status(status, _) => FetchError::Status { url: url.to_string(), status },
            ureq::Error::Transport(t) => FetchError::Transport {
                url: url.to_string(),
                message: t.to_string(),
            },
        })?;

        let body = response.into_string().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url: url.to_string(), source })
    }
}
