//! General Utilities for Vitalis Core.
//!
//! - [`async_utils`]: thin wrappers over `tokio` for spawning, deadlines and intervals.
//! - [`fs`]: directory creation and file reads/writes mapped to [`crate::CoreError`].
//! - [`paths`]: XDG and application-specific directory resolution.

pub mod async_utils;
pub mod fs;
pub mod paths;

pub use async_utils::{interval_at, sleep_until, spawn_task};
pub use fs::{ensure_dir_exists, read_bytes, remove_file_if_exists, write_atomic};
