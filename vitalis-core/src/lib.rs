//! # Vitalis Core Library (`vitalis-core`)
//!
//! `vitalis-core` is the infrastructure layer shared by the Vitalis crates. It
//! carries no notification semantics of its own; the engine lives in
//! `vitalis-domain` and builds on the pieces exported here:
//!
//! - **Error Handling**: [`CoreError`] and the more specific [`ConfigError`].
//! - **Configuration**: TOML loading with defaults and validation through
//!   [`ConfigLoader`], producing a [`CoreConfig`].
//! - **Logging**: `tracing`-based console and rolling-file output.
//! - **Utilities**: filesystem helpers, XDG path resolution and small async
//!   wrappers around `tokio`.
//!
//! ```rust,ignore
//! use vitalis_core::config::ConfigLoader;
//! use vitalis_core::logging::init_logging;
//!
//! fn main() -> Result<(), vitalis_core::CoreError> {
//!     let config = ConfigLoader::load()?;
//!     init_logging(&config.logging, false)?;
//!     tracing::info!("Vitalis core initialized");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

pub use config::{ConfigLoader, CoreConfig, LoggingConfig, NotificationEngineConfig};
pub use error::{ConfigError, CoreError};
pub use logging::{init_logging, init_minimal_logging};
pub use utils::{
    ensure_dir_exists, interval_at, read_bytes, remove_file_if_exists, sleep_until, spawn_task,
    write_atomic,
};
