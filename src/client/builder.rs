use crate::client::command::{CommandConfig, CommandState};
use crate::client::core::Client;
use crate::transport::{HttpTransport, TransportConfig};
use crate::Result;
use std::collections::HashMap;
use std::time::Duration;

/// Builder for [`Client`].
///
/// Keep this surface small and predictable: commands plus a couple of
/// connection-pool knobs.
pub struct ClientBuilder {
    commands: Vec<(String, CommandConfig)>,
    transport: TransportConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            transport: TransportConfig::default(),
        }
    }

    /// Register a command. Registering the same name twice keeps the last
    /// configuration.
    pub fn command(mut self, name: impl Into<String>, config: CommandConfig) -> Self {
        self.commands.push((name.into(), config));
        self
    }

    /// Register a command with default configuration.
    pub fn command_with_defaults(self, name: impl Into<String>) -> Self {
        self.command(name, CommandConfig::default())
    }

    pub fn pool_max_idle_per_host(mut self, n: usize) -> Self {
        self.transport.pool_max_idle_per_host = n;
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.transport.pool_idle_timeout = timeout;
        self
    }

    /// Build the client. The command registry is frozen from here on.
    pub fn build(self) -> Result<Client> {
        let transport = HttpTransport::new(&self.transport)?;

        let mut commands = HashMap::with_capacity(self.commands.len());
        for (name, config) in self.commands {
            commands.insert(name.clone(), CommandState::new(name, config));
        }

        Ok(Client {
            transport,
            commands,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_commands_resolve() {
        let client = ClientBuilder::new()
            .command("orders", CommandConfig::default())
            .command_with_defaults("payments")
            .build()
            .unwrap();

        assert!(client.signals("orders").is_ok());
        assert!(client.signals("payments").is_ok());
        assert!(matches!(
            client.signals("missing"),
            Err(crate::Error::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_duplicate_registration_keeps_last() {
        let client = ClientBuilder::new()
            .command(
                "orders",
                CommandConfig::new().with_max_concurrent_requests(5),
            )
            .command(
                "orders",
                CommandConfig::new().with_max_concurrent_requests(7),
            )
            .build()
            .unwrap();

        assert_eq!(client.signals("orders").unwrap().inflight.max, 7);
    }
}
