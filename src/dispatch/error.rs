//! Dispatch Error Types
//!
//! Admission timeouts, processing failures and expiry are ordinary
//! outcomes reported through return values and callbacks. The only error
//! is a poisoned lock left behind by a panicking message callback.

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Synchronisation failure: {message}")]
    Synchronisation { message: String },
}

impl crate::core::error_handling::ContextualError for DispatchError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;
