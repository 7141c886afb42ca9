//! Client facade: the public invocation surface.
//!
//! Developer-friendly goal: keep the public surface small and predictable.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod command;
pub mod core;
pub mod signals;

pub use self::builder::ClientBuilder;
pub use self::command::CommandConfig;
pub use self::core::Client;
pub use self::signals::CommandSnapshot;
