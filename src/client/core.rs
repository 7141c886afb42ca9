use crate::client::command::CommandState;
use crate::client::signals::CommandSnapshot;
use crate::executor::{run_bounded, CancelSignal, ExecOutcome};
use crate::transport::HttpTransport;
use crate::types::{Body, Request, Response};
use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Resilient outbound HTTP client.
///
/// Every call runs under a named command's admission cap, circuit breaker
/// and deadline. The command registry is owned by this instance: two clients
/// in the same process never share or collide on command state.
///
/// ```rust,no_run
/// use fusegate::{Client, CommandConfig, Request};
///
/// # async fn example() -> fusegate::Result<()> {
/// let client = Client::builder()
///     .command("orders", CommandConfig::default())
///     .build()?;
///
/// let resp = client.invoke("orders", Request::get("https://api.example.com/orders")).await?;
/// println!("{}", resp.status);
/// # Ok(())
/// # }
/// ```
pub struct Client {
    pub(crate) transport: HttpTransport,
    pub(crate) commands: HashMap<String, CommandState>,
}

impl Client {
    /// Start building a client. Commands are registered on the builder.
    pub fn builder() -> crate::client::builder::ClientBuilder {
        crate::client::builder::ClientBuilder::new()
    }

    fn command(&self, name: &str) -> Result<&CommandState> {
        self.commands
            .get(name)
            .ok_or_else(|| Error::UnknownCommand(name.to_string()))
    }

    /// Execute one request under the named command's guards.
    ///
    /// Fails fast with [`Error::ConcurrencyExceeded`] or
    /// [`Error::CircuitOpen`] before any network activity; otherwise runs
    /// the call under the command's deadline and records the outcome.
    pub async fn invoke(&self, command: &str, request: Request) -> Result<Response> {
        self.invoke_inner(command, request, None).await
    }

    /// Like [`Client::invoke`], but abortable through a
    /// [`CancelSignal`](crate::executor::CancelSignal).
    pub async fn invoke_with_cancel(
        &self,
        command: &str,
        request: Request,
        cancel: CancelSignal,
    ) -> Result<Response> {
        self.invoke_inner(command, request, Some(cancel)).await
    }

    /// Execute one request and decode the response body as JSON into `T`.
    ///
    /// Decoding happens regardless of HTTP status; a malformed body yields
    /// [`Error::Decode`], which is not charged to the circuit breaker since
    /// the exchange itself completed.
    pub async fn invoke_json<T: DeserializeOwned>(
        &self,
        command: &str,
        request: Request,
    ) -> Result<(Response, T)> {
        let response = self.invoke(command, request).await?;
        let value = response.json()?;
        Ok((response, value))
    }

    /// GET `target` with the given headers.
    pub async fn get(&self, command: &str, target: &str, headers: HeaderMap) -> Result<Response> {
        self.invoke(command, Request::get(target).with_headers(headers))
            .await
    }

    /// GET `target` and decode the JSON response body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        command: &str,
        target: &str,
        headers: HeaderMap,
    ) -> Result<(Response, T)> {
        self.invoke_json(command, Request::get(target).with_headers(headers))
            .await
    }

    /// POST `body` to `target` with the given headers.
    pub async fn post(
        &self,
        command: &str,
        target: &str,
        headers: HeaderMap,
        body: impl Into<Body>,
    ) -> Result<Response> {
        self.invoke(
            command,
            Request::post(target).with_headers(headers).with_body(body),
        )
        .await
    }

    /// POST `body` to `target` and decode the JSON response body into `T`.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        command: &str,
        target: &str,
        headers: HeaderMap,
        body: impl Into<Body>,
    ) -> Result<(Response, T)> {
        self.invoke_json(
            command,
            Request::post(target).with_headers(headers).with_body(body),
        )
        .await
    }

    /// Snapshot the named command's runtime signals (facts only).
    pub fn signals(&self, command: &str) -> Result<CommandSnapshot> {
        let cmd = self.command(command)?;
        Ok(CommandSnapshot {
            command: cmd.name.clone(),
            inflight: cmd.admission.snapshot(),
            circuit: cmd.breaker.snapshot(),
        })
    }

    async fn invoke_inner(
        &self,
        command: &str,
        request: Request,
        cancel: Option<CancelSignal>,
    ) -> Result<Response> {
        let cmd = self.command(command)?;

        // Encode structured bodies before admission: a serialization error
        // is a caller bug, not a destination failure.
        let request = request.prepared()?;

        let _permit = cmd
            .admission
            .try_acquire()
            .ok_or_else(|| Error::ConcurrencyExceeded {
                command: cmd.name.clone(),
                max: cmd.admission.max(),
            })?;

        if !cmd.breaker.allow() {
            // The permit drops on return, so the slot is released before the
            // caller sees the rejection.
            return Err(Error::CircuitOpen {
                command: cmd.name.clone(),
            });
        }

        let request_id = Uuid::new_v4().to_string();
        let request = match HeaderValue::from_str(&request_id) {
            Ok(value) => request.with_header("x-request-id", value),
            Err(_) => request,
        };

        let start = Instant::now();
        let outcome = run_bounded(self.transport.execute(request), cmd.config.timeout, cancel).await;

        match outcome {
            ExecOutcome::Success(response) => {
                cmd.breaker.record(true);
                info!(
                    command = %cmd.name,
                    request_id = request_id.as_str(),
                    http_status = response.status.as_u16(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "request completed"
                );
                Ok(response)
            }
            ExecOutcome::Failure(err) => {
                if err.counts_as_circuit_failure() {
                    cmd.breaker.record(false);
                } else {
                    // No verdict on the destination; just free a probe slot
                    // if this was the half-open trial.
                    cmd.breaker.abandon_probe();
                }
                info!(
                    command = %cmd.name,
                    request_id = request_id.as_str(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "request failed"
                );
                Err(err)
            }
            ExecOutcome::TimedOut => {
                cmd.breaker.record(false);
                info!(
                    command = %cmd.name,
                    request_id = request_id.as_str(),
                    timeout_ms = cmd.config.timeout.as_millis() as u64,
                    "request timed out"
                );
                Err(Error::Timeout {
                    command: cmd.name.clone(),
                    after: cmd.config.timeout,
                })
            }
            ExecOutcome::Cancelled => {
                // Caller-initiated: says nothing about destination health, so
                // no outcome is recorded. An abandoned half-open probe sends
                // the circuit back to open for another cooldown.
                cmd.breaker.abandon_probe();
                info!(
                    command = %cmd.name,
                    request_id = request_id.as_str(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "request cancelled"
                );
                Err(Error::Cancelled)
            }
        }
        // `_permit` drops here on every path, releasing the admission slot
        // exactly once even if the transport panicked.
    }
}
