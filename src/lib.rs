//! # fusegate
//!
//! A resilient outbound HTTP client: issues calls while protecting both the
//! caller and the remote service from cascading failure.
//!
//! Every logical destination is a named **command** with its own
//! configuration and state. Before any network activity, a call must pass
//! the command's admission cap (bounded in-flight concurrency, fail-fast)
//! and its circuit breaker (rolling error-rate window with open/half-open
//! cooldown). Admitted calls run under a per-command deadline, and their
//! outcomes feed back into the breaker.
//!
//! ## Key features
//!
//! - **Per-command isolation**: each command owns its circuit breaker and
//!   in-flight counter; unrelated destinations never contend on a lock.
//! - **Fail-fast backpressure**: no internal queueing — an over-budget or
//!   circuit-open call is rejected immediately with a typed error.
//! - **Bounded execution**: calls race a deadline and an optional caller
//!   cancellation signal; admission slots are released on every exit path.
//! - **Typed bodies**: requests carry an explicit [`Body`] tag (empty,
//!   bytes, text, JSON, stream) instead of runtime type inspection.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use fusegate::{json_headers, Body, Client, CommandConfig, Request};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct CreateLink { url: String }
//!
//! #[derive(Deserialize)]
//! struct Created { id: String }
//!
//! #[tokio::main]
//! async fn main() -> fusegate::Result<()> {
//!     let client = Client::builder()
//!         .command(
//!             "links",
//!             CommandConfig::new()
//!                 .with_timeout(Duration::from_secs(5))
//!                 .with_max_concurrent_requests(50),
//!         )
//!         .build()?;
//!
//!     let body = Body::json(&CreateLink { url: "https://example.com".into() })?;
//!     let (resp, created): (_, Created) = client
//!         .post_json("links", "https://api.example.com/links", json_headers(), body)
//!         .await?;
//!
//!     println!("{} -> {}", resp.status, created.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Module organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client facade, builder and command registry |
//! | [`resilience`] | Admission control, circuit breaker, rolling window |
//! | [`executor`] | Deadline/cancellation racing for one unit of work |
//! | [`transport`] | Pooled HTTP transport |
//! | [`types`] | Request, response and body types |

pub mod client;
pub mod executor;
pub mod resilience;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{Client, ClientBuilder, CommandConfig, CommandSnapshot};
pub use executor::{cancel_pair, CancelHandle, CancelSignal};
pub use types::{json_headers, Body, Request, Response};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::Error;
