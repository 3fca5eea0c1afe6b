//! # Error Handling
//!
//! A single error type for the staging client, carrying a small amount of
//! context (operation, free-form context, recovery suggestion, severity) and
//! a set of classification traits used by the CLI to decide how to present a
//! failure.
//!
//! ## Failure kinds
//!
//! - **Invalid upload**: non-image input, rejected before any state change
//! - **Backend / Network**: the generation call failed; terminal for that
//!   attempt, the user re-triggers explicitly
//! - **Decode / Export**: local image work failed
//! - **Storage / Config / Io**: local environment problems
//! - **InvalidState / StyleLocked / ProfileNotFound**: session misuse
//!
//! ## Usage
//!
//! ```rust
//! use virtual_stager::error::{StagingError, Retryable, HasRecoverySuggestion};
//!
//! let error = StagingError::network("generate-image", "connection refused")
//!     .with_recovery_suggestion("Check that the staging backend is running");
//!
//! assert!(error.is_retryable());
//! assert!(error.recovery_suggestion().is_some());
//! ```

use std::{error::Error as StdError, fmt, time::SystemTime};

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Warnings that may indicate potential issues
    Warning,
    /// Errors that abort the current action but leave the session usable
    Error,
    /// Errors that leave the client unable to continue
    Fatal,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }
}

/// Base error type for the staging client
#[derive(Debug)]
pub enum StagingError {
    /// The supplied file is not an image
    InvalidUpload {
        name: String,
        mime: String,
        context: ErrorContext,
    },
    /// Image bytes or a data URL could not be decoded
    Decode { reason: String, context: ErrorContext },
    /// The generation backend answered with an error
    Backend {
        status: Option<u16>,
        message: String,
        context: ErrorContext,
    },
    /// The generation backend could not be reached
    Network {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Export resize or encode failed
    Export {
        format: String,
        reason: String,
        context: ErrorContext,
    },
    /// Local persistent storage could not be read or written
    Storage {
        key: String,
        reason: String,
        context: ErrorContext,
    },
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// The session is not in a state that allows the operation
    InvalidState {
        current_state: String,
        attempted_operation: String,
        context: ErrorContext,
    },
    /// Style changes are locked while a house profile is active
    StyleLocked {
        profile_name: String,
        context: ErrorContext,
    },
    /// No house profile matches the given id or name
    ProfileNotFound { query: String, context: ErrorContext },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
}

impl StagingError {
    /// Create an invalid-upload error
    pub fn invalid_upload(name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self::InvalidUpload {
            name: name.into(),
            mime: mime.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a decode error
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a backend error
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a network error
    pub fn network(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an export error
    pub fn export(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Export {
            format: format.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a storage error
    pub fn storage(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an invalid-state error
    pub fn invalid_state(
        current_state: impl Into<String>,
        attempted_operation: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a style-locked error
    pub fn style_locked(profile_name: impl Into<String>) -> Self {
        Self::StyleLocked {
            profile_name: profile_name.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a profile-not-found error
    pub fn profile_not_found(query: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            query: query.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Attach the path an I/O error refers to
    pub fn with_path(mut self, p: impl Into<String>) -> Self {
        if let Self::Io { path, .. } = &mut self {
            *path = Some(p.into());
        }
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::InvalidUpload { context, .. } => context,
            Self::Decode { context, .. } => context,
            Self::Backend { context, .. } => context,
            Self::Network { context, .. } => context,
            Self::Export { context, .. } => context,
            Self::Storage { context, .. } => context,
            Self::Config { context, .. } => context,
            Self::InvalidState { context, .. } => context,
            Self::StyleLocked { context, .. } => context,
            Self::ProfileNotFound { context, .. } => context,
            Self::Io { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::InvalidUpload { context, .. } => context,
            Self::Decode { context, .. } => context,
            Self::Backend { context, .. } => context,
            Self::Network { context, .. } => context,
            Self::Export { context, .. } => context,
            Self::Storage { context, .. } => context,
            Self::Config { context, .. } => context,
            Self::InvalidState { context, .. } => context,
            Self::StyleLocked { context, .. } => context,
            Self::ProfileNotFound { context, .. } => context,
            Self::Io { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidUpload { .. } => "invalid_upload",
            Self::Decode { .. } => "decode",
            Self::Backend { .. } => "backend",
            Self::Network { .. } => "network",
            Self::Export { .. } => "export",
            Self::Storage { .. } => "storage",
            Self::Config { .. } => "config",
            Self::InvalidState { .. } => "invalid_state",
            Self::StyleLocked { .. } => "style_locked",
            Self::ProfileNotFound { .. } => "profile_not_found",
            Self::Io { .. } => "io",
        }
    }

    /// Message suitable for the error phase of the session.
    ///
    /// Backend messages are surfaced verbatim; everything else uses `Display`.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for StagingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagingError::InvalidUpload { name, mime, .. } => {
                write!(
                    f,
                    "'{}' is not an image (detected type: {}). Please upload an image file",
                    name, mime
                )
            }
            StagingError::Decode { reason, .. } => write!(f, "Failed to decode image: {}", reason),
            StagingError::Backend {
                status, message, ..
            } => match status {
                Some(status) => write!(f, "Staging backend error (HTTP {}): {}", status, message),
                None => write!(f, "Staging backend error: {}", message),
            },
            StagingError::Network {
                operation, reason, ..
            } => write!(f, "Network error during {}: {}", operation, reason),
            StagingError::Export { format, reason, .. } => {
                write!(f, "Export to {} failed: {}", format, reason)
            }
            StagingError::Storage { key, reason, .. } => {
                write!(f, "Storage error for '{}': {}", key, reason)
            }
            StagingError::Config {
                field,
                value,
                reason,
                ..
            } => write!(
                f,
                "Configuration error in '{}': {} (value: {})",
                field, reason, value
            ),
            StagingError::InvalidState {
                current_state,
                attempted_operation,
                ..
            } => write!(
                f,
                "Cannot {} while the session is {}",
                attempted_operation, current_state
            ),
            StagingError::StyleLocked { profile_name, .. } => write!(
                f,
                "Style is locked to house profile '{}'; clear the profile to change it",
                profile_name
            ),
            StagingError::ProfileNotFound { query, .. } => {
                write!(f, "No house profile matches '{}'", query)
            }
            StagingError::Io {
                operation,
                path,
                source,
                ..
            } => match path {
                Some(path) => write!(f, "I/O error during {} on '{}': {}", operation, path, source),
                None => write!(f, "I/O error during {}: {}", operation, source),
            },
        }
    }
}

impl StdError for StagingError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type StagingResult<T> = Result<T, StagingError>;

/// Trait for errors that can be retried.
///
/// Retries are never automatic; this only tells the caller whether offering
/// a "try again" action makes sense.
pub trait Retryable {
    /// Check if this error can be retried
    fn is_retryable(&self) -> bool;
}

impl Retryable for StagingError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Backend { status, .. } => status.is_none_or(|s| s >= 500),
            _ => false,
        }
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for StagingError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for StagingError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

impl From<std::io::Error> for StagingError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<image::ImageError> for StagingError {
    fn from(error: image::ImageError) -> Self {
        Self::decode(error.to_string())
    }
}

impl From<base64::DecodeError> for StagingError {
    fn from(error: base64::DecodeError) -> Self {
        Self::decode(format!("invalid base64 payload: {}", error))
    }
}
