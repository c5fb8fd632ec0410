//! Generic error handling utilities
//!
//! Provides unified error reporting across the dispatcher and the CLI
//! while keeping each module's own error enum.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should
/// return `Some(message)` with a message the user can act on. When it
/// returns `false`, `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message meant for the user
    ///
    /// Examples of user-actionable errors:
    /// - Malformed configuration values
    /// - Missing configuration files named on the command line
    ///
    /// Examples of system errors:
    /// - Poisoned locks after a panicking message callback
    /// - Logger initialisation failures
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// User-actionable errors log their own message; system errors log the
/// operation context. Full detail always goes to debug level.
///
/// # Examples
/// ```rust,no_run
/// # use ses::core::error_handling::log_error_with_context;
/// # use ses::app::config::ConfigError;
/// let err = ConfigError::Invalid {
///     field: "manager.gate_timeout_ms".to_string(),
///     message: "Invalid configuration value for manager.gate_timeout_ms: must be greater than 0"
///         .to_string(),
/// };
/// log_error_with_context(&err, "Configuration loading");
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
