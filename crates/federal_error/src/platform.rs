//! Chat platform call errors.

/// A failed call against the chat platform (send, edit, fetch, role change,
/// channel create or delete).
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Platform Error: {} failed: {} at line {} in {}", operation, message, line, file)]
pub struct PlatformError {
    /// Platform operation that failed (e.g. "send_message")
    pub operation: String,
    /// Error reported by the platform
    pub message: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PlatformError {
    /// Create a new platform error with automatic location tracking.
    ///
    /// # Examples
    ///
    /// ```
    /// use federal_error::PlatformError;
    ///
    /// let err = PlatformError::new("pin_message", "Missing Permissions");
    /// assert_eq!(err.operation, "pin_message");
    /// ```
    #[track_caller]
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            operation: operation.into(),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for platform calls.
pub type PlatformResult<T> = Result<T, PlatformError>;
