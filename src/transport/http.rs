use crate::types::{Body, Request, Response};
use crate::{Error, Result};
use std::time::Duration;

/// Connection-pool knobs for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

/// One pooled HTTP client shared by every command of a [`crate::Client`].
///
/// Deliberately carries no request timeout of its own: deadlines are
/// enforced per command by the bounded executor.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(cfg: &TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(cfg.pool_max_idle_per_host)
            .pool_idle_timeout(Some(cfg.pool_idle_timeout))
            .build()?;
        Ok(Self { client })
    }

    /// Send one request and read the full response body.
    ///
    /// A non-2xx status is not an error here; the exchange completed and the
    /// caller decides what the status means. Only transport-level problems
    /// (connect, TLS, read) surface as [`Error::Transport`].
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let Request {
            method,
            target,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, target).headers(headers);
        builder = match body {
            Body::Empty => builder,
            Body::Bytes(bytes) => builder.body(bytes),
            Body::Text(text) => builder.body(text),
            // Normally pre-encoded by `Request::prepared`; kept for direct
            // transport use.
            Body::Json(value) => builder.body(serde_json::to_vec(&value).map_err(Error::Serialize)?),
            Body::Stream(stream) => builder.body(stream),
        };

        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
