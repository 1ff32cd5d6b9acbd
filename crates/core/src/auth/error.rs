use thiserror::Error;

/// Errors reported by an authentication service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("failed to start OAuth sign-in: {0}")]
    SignIn(String),

    #[error("failed to look up current session: {0}")]
    SessionLookup(String),

    #[error("unknown OAuth provider: {0}")]
    UnknownProvider(String),

    #[error("auth service error: {0}")]
    Service(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_display() {
        let error = AuthError::SignIn("redirect blocked".to_string());
        assert_eq!(
            error.to_string(),
            "failed to start OAuth sign-in: redirect blocked"
        );
    }

    #[test]
    fn test_session_lookup_display() {
        let error = AuthError::SessionLookup("storage unavailable".to_string());
        assert_eq!(
            error.to_string(),
            "failed to look up current session: storage unavailable"
        );
    }

    #[test]
    fn test_unknown_provider_display() {
        let error = AuthError::UnknownProvider("myspace".to_string());
        assert_eq!(error.to_string(), "unknown OAuth provider: myspace");
    }
}
