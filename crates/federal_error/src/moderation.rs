//! Moderation workflow errors.
//!
//! Every user-initiated action ends either in a success acknowledgement or in
//! one of these kinds. User-readable kinds carry the exact text shown to the
//! member; `PlatformCall` and `Persistence` carry diagnostics only and are
//! replaced by a generic message when surfaced.

use crate::{PlatformError, StorageError};
use derive_getters::Getters;

const GENERIC_FAILURE: &str =
    "❌ Ocorreu um erro ao processar sua solicitação. Tente novamente mais tarde.";

/// Moderation error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ModerationErrorKind {
    /// Record, channel or member is absent.
    #[display("Not found: {_0}")]
    NotFound(String),

    /// Free-text identity could not be mapped to a current member.
    #[display("Identity resolution failed: {_0}")]
    Resolution(String),

    /// Caller lacks the required role or permission.
    #[display("Permission denied: {_0}")]
    Permission(String),

    /// Target already has the access or entry being added.
    #[display("Already present: {_0}")]
    AlreadyPresent(String),

    /// Target has no access or entry to remove.
    #[display("Not present: {_0}")]
    NotPresent(String),

    /// Ticket owner cannot be removed from their own ticket.
    #[display("Owner protected: {_0}")]
    OwnerProtected(String),

    /// Submitted value failed validation (unknown category, malformed id).
    #[display("Invalid input: {_0}")]
    InvalidInput(String),

    /// A critical platform call failed.
    #[display("Platform call failed: {_0}")]
    PlatformCall(String),

    /// A record could not be persisted.
    #[display("Persistence failed: {_0}")]
    Persistence(String),
}

impl ModerationErrorKind {
    /// Text shown to the member who triggered the failed action.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Resolution(msg)
            | Self::Permission(msg)
            | Self::AlreadyPresent(msg)
            | Self::NotPresent(msg)
            | Self::OwnerProtected(msg)
            | Self::InvalidInput(msg) => format!("❌ {msg}"),
            Self::PlatformCall(_) | Self::Persistence(_) => GENERIC_FAILURE.to_string(),
        }
    }

    /// Whether the failure is internal (logged at error level, generic reply).
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::PlatformCall(_) | Self::Persistence(_))
    }
}

/// Moderation error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display("Moderation Error: {} at line {} in {}", kind, line, file)]
pub struct ModerationError {
    kind: ModerationErrorKind,
    line: u32,
    file: &'static str,
}

impl ModerationError {
    /// Create a new ModerationError with automatic location tracking.
    ///
    /// # Example
    /// ```
    /// use federal_error::{ModerationError, ModerationErrorKind};
    ///
    /// let err = ModerationError::new(ModerationErrorKind::Permission(
    ///     "Apenas a equipe pode usar este botão.".to_string(),
    /// ));
    /// assert!(err.kind().user_message().contains("Apenas a equipe"));
    /// ```
    #[track_caller]
    pub fn new(kind: ModerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl From<PlatformError> for ModerationError {
    #[track_caller]
    fn from(err: PlatformError) -> Self {
        ModerationError::new(ModerationErrorKind::PlatformCall(err.to_string()))
    }
}

impl From<StorageError> for ModerationError {
    #[track_caller]
    fn from(err: StorageError) -> Self {
        ModerationError::new(ModerationErrorKind::Persistence(err.to_string()))
    }
}

/// Result type for moderation operations.
pub type ModerationResult<T> = Result<T, ModerationError>;
