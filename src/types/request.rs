use crate::{Error, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;

/// Request body as an explicit tagged union.
///
/// The caller states what the body is instead of the library inspecting a
/// runtime type: nothing, verbatim bytes or text, a structured value to be
/// serialized as JSON, or an already-open byte stream passed through
/// unmodified.
#[derive(Debug)]
pub enum Body {
    Empty,
    Bytes(Bytes),
    Text(String),
    Json(serde_json::Value),
    Stream(reqwest::Body),
}

impl Body {
    /// Capture a structured value for JSON serialization.
    ///
    /// Serialization problems surface here, before the request is admitted,
    /// so a malformed body never counts against the destination's circuit.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(Error::Serialize)
    }

    /// Wrap an open byte stream; it is sent as-is without buffering.
    pub fn stream<S>(stream: S) -> Self
    where
        S: futures::TryStream + Send + Sync + 'static,
        S::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        Bytes: From<S::Ok>,
    {
        Body::Stream(reqwest::Body::wrap_stream(stream))
    }

    pub fn is_empty_variant(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Empty
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes.into())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

/// One outbound HTTP request.
///
/// Header keys are case-insensitive; writing the same key twice keeps the
/// last value, so each key maps to a single value as sent.
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub target: String,
    pub headers: HeaderMap,
    pub body: Body,
}

impl Request {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    /// Replace all headers at once.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set a single header (overwrites an existing value for the key).
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Encode a structured body up front.
    ///
    /// `Body::Json` becomes raw bytes here, and a missing content-type is
    /// filled in with `application/json`. Runs before admission so encoding
    /// errors are never charged to the circuit breaker.
    pub(crate) fn prepared(mut self) -> Result<Self> {
        if let Body::Json(value) = &self.body {
            let encoded = serde_json::to_vec(value).map_err(Error::Serialize)?;
            self.body = Body::Bytes(encoded.into());
            if !self.headers.contains_key(CONTENT_TYPE) {
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
        }
        Ok(self)
    }
}

/// Headers for callers that send JSON bodies: `content-type: application/json`.
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        name: String,
        age: u32,
    }

    #[test]
    fn test_json_headers_content_type() {
        let headers = json_headers();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_header_overwrite_keeps_single_value() {
        let mixed_case = reqwest::header::HeaderName::from_bytes(b"X-K").unwrap();
        let req = Request::get("http://example.com")
            .with_header("x-k", HeaderValue::from_static("v1"))
            .with_header(mixed_case, HeaderValue::from_static("v2"));

        // Case-insensitive key, last write wins, one value as sent.
        assert_eq!(req.headers.get("x-k").unwrap(), "v2");
        assert_eq!(req.headers.get_all("x-k").iter().count(), 1);
    }

    #[test]
    fn test_prepared_encodes_json_and_sets_content_type() {
        let body = Body::json(&Payload {
            name: "tester".into(),
            age: 9,
        })
        .unwrap();
        let req = Request::post("http://example.com")
            .with_body(body)
            .prepared()
            .unwrap();

        match &req.body {
            Body::Bytes(bytes) => {
                let decoded: Payload = serde_json::from_slice(bytes).unwrap();
                assert_eq!(decoded.name, "tester");
            }
            other => panic!("expected encoded bytes, got {:?}", other),
        }
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_prepared_keeps_caller_content_type() {
        let req = Request::post("http://example.com")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/vnd.acme+json"))
            .with_body(Body::Json(serde_json::json!({"k": "v"})))
            .prepared()
            .unwrap();
        assert_eq!(
            req.headers.get(CONTENT_TYPE).unwrap(),
            "application/vnd.acme+json"
        );
    }

    #[test]
    fn test_prepared_leaves_raw_bodies_alone() {
        let req = Request::post("http://example.com")
            .with_body("raw text")
            .prepared()
            .unwrap();
        assert!(matches!(req.body, Body::Text(ref t) if t == "raw text"));
        assert!(req.headers.get(CONTENT_TYPE).is_none());
    }
}
