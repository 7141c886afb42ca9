//! HTTP transport layer: a thin wrapper over a shared connection pool.

mod http;

pub use http::{HttpTransport, TransportConfig};
