//! Top-level error wrapper types.

use crate::{ConfigError, ModerationError, PlatformError, StorageError};

/// Foundation error enum covering every concern in the workspace.
///
/// # Examples
///
/// ```
/// use federal_error::{FederalError, ConfigError};
///
/// let err: FederalError = ConfigError::new("missing token").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FederalErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Record store error
    #[from(StorageError)]
    Storage(StorageError),
    /// Chat platform error
    #[from(PlatformError)]
    Platform(PlatformError),
    /// Moderation workflow error
    #[from(ModerationError)]
    Moderation(ModerationError),
}

/// Bot error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Federal Error: {}", _0)]
pub struct FederalError(Box<FederalErrorKind>);

impl FederalError {
    /// Create a new error from a kind.
    pub fn new(kind: FederalErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FederalErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to FederalErrorKind
impl<T> From<T> for FederalError
where
    T: Into<FederalErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for top-level operations.
pub type FederalResult<T> = std::result::Result<T, FederalError>;
