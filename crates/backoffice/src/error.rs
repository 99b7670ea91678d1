//! Unified error handling for the back office.

use thiserror::Error;

use crate::remote::RemoteError;

/// A form field failed validation. No request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Input field the message applies to (e.g., "name").
    pub field: &'static str,
    /// User-facing message.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// A required field was left empty.
    #[must_use]
    pub fn required(field: &'static str, label: &str) -> Self {
        Self::new(field, format!("Please enter {label}."))
    }
}

/// Application-level error type for form and service operations.
///
/// Every variant is terminal to the operation that raised it and leaves the
/// controller state as it was.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before any request was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote table call failed.
    #[error("{action}: {source}")]
    Remote {
        /// What was being attempted, e.g. "Error saving brand".
        action: String,
        /// Underlying failure.
        #[source]
        source: RemoteError,
    },

    /// The operation needs a selected grid row.
    #[error("Please select a {0} first.")]
    NoSelection(&'static str),

    /// The owning view closed while the call was in flight.
    #[error("Operation cancelled")]
    Cancelled,
}

impl AppError {
    /// Wrap a remote failure, reporting it to Sentry.
    pub fn remote(action: impl Into<String>, source: RemoteError) -> Self {
        let err = Self::Remote {
            action: action.into(),
            source,
        };
        err.report();
        err
    }

    /// Log the error at the level its kind deserves.
    fn report(&self) {
        match self {
            Self::Remote { .. } => {
                let event_id = sentry::capture_error(self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Remote table error"
                );
            }
            Self::Validation(err) => {
                tracing::debug!(field = err.field, message = %err.message, "Validation failed");
            }
            Self::NoSelection(_) | Self::Cancelled => {}
        }
    }

    /// Title and message for the dialog the UI shows.
    #[must_use]
    pub fn dialog(&self) -> (&'static str, String) {
        match self {
            Self::Validation(err) => ("Validation Error", err.message.clone()),
            Self::Remote { .. } => ("Error", self.to_string()),
            Self::NoSelection(_) => ("Selection Required", self.to_string()),
            Self::Cancelled => ("Cancelled", self.to_string()),
        }
    }

    /// Whether the error came from a closed view.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result alias for form and service operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_dialog() {
        let err = AppError::from(ValidationError::required("name", "brand name"));
        assert_eq!(
            err.dialog(),
            ("Validation Error", "Please enter brand name.".to_string())
        );
    }

    #[test]
    fn test_remote_dialog_names_action() {
        let err = AppError::remote(
            "Error saving brand",
            RemoteError::Unavailable("connection reset".to_string()),
        );
        assert_eq!(
            err.dialog(),
            (
                "Error",
                "Error saving brand: Service unavailable: connection reset".to_string()
            )
        );
    }

    #[test]
    fn test_no_selection_message() {
        let err = AppError::NoSelection("brand");
        assert_eq!(err.to_string(), "Please select a brand first.");
        assert!(!err.is_cancelled());
        assert!(AppError::Cancelled.is_cancelled());
    }
}
