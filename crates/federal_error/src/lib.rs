//! Error types for the Polícia Federal moderation bot.
//!
//! This crate provides the foundation error types used throughout the workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use federal_error::{FederalResult, ConfigError};
//!
//! fn load() -> FederalResult<String> {
//!     Err(ConfigError::new("missing [guild] section"))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod moderation;
mod platform;
mod storage;

pub use config::ConfigError;
pub use error::{FederalError, FederalErrorKind, FederalResult};
pub use moderation::{ModerationError, ModerationErrorKind, ModerationResult};
pub use platform::{PlatformError, PlatformResult};
pub use storage::{StorageError, StorageErrorKind, StorageResult};
