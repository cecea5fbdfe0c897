//! Error types for the status-transition engine.

use thiserror::Error;

/// Errors that can occur while validating a status transition.
#[derive(Debug, Clone, Error)]
pub enum StateMachineError {
    /// Requested status is not reachable from the current status.
    #[error("Invalid status transition from {from} to {to} (allowed: {})", allowed.join(", "))]
    InvalidTransition {
        /// The current status.
        from: String,
        /// The attempted target status.
        to: String,
        /// The statuses reachable from the current one.
        allowed: Vec<String>,
    },

    /// Stored status string could not be parsed into the status enum.
    #[error("Unknown status '{0}'")]
    UnknownStatus(String),
}

impl StateMachineError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } => 422,
            Self::UnknownStatus(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::UnknownStatus(_) => "UNKNOWN_STATUS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display_lists_allowed() {
        let err = StateMachineError::InvalidTransition {
            from: "draft".to_string(),
            to: "shipped".to_string(),
            allowed: vec!["sent".to_string(), "cancelled".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("draft"));
        assert!(msg.contains("shipped"));
        assert!(msg.contains("sent, cancelled"));
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }

    #[test]
    fn test_unknown_status() {
        let err = StateMachineError::UnknownStatus("bogus".to_string());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "UNKNOWN_STATUS");
    }
}
