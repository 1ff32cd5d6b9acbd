use thiserror::Error;

/// Auth errors for the jotter_auth crate.
///
/// This wraps the core `AuthError` reported by an auth service and adds
/// crate-specific variants that can't live in the functional core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error reported by the auth service (sign-in, session lookup, ...)
    #[error(transparent)]
    Core(#[from] jotter_core::auth::AuthError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Returns true if the error came from the auth service rather than
    /// from local configuration.
    pub fn is_service_error(&self) -> bool {
        matches!(self, AuthError::Core(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jotter_core::auth::AuthError as CoreError;

    #[test]
    fn test_core_error_is_transparent() {
        let error = AuthError::from(CoreError::SessionLookup("offline".to_string()));
        assert_eq!(
            error.to_string(),
            "failed to look up current session: offline"
        );
        assert!(error.is_service_error());
    }

    #[test]
    fn test_config_error_display() {
        let error = AuthError::Config("AUTH_PROVIDER is invalid".to_string());
        assert_eq!(
            error.to_string(),
            "configuration error: AUTH_PROVIDER is invalid"
        );
        assert!(!error.is_service_error());
    }
}
