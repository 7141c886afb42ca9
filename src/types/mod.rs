//! Core request/response types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Request`] | Method, target URL, headers and a tagged body |
//! | [`Body`] | Explicit body kind: empty, bytes, text, JSON or stream |
//! | [`Response`] | Status, headers and the fully read body bytes |
//!
//! [`json_headers`] provides the `content-type: application/json` header map
//! for callers that send JSON bodies.

pub mod request;
pub mod response;

pub use request::{json_headers, Body, Request};
pub use response::Response;
