use std::sync::Arc;

use async_trait::async_trait;

use super::{AuthError, OAuthProvider, Session, SessionEvent, SignInOptions};
use crate::store::Subscription;

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Callback invoked by an [`AuthService`] on every session change.
///
/// The session is `None` after a sign-out.
pub type SessionChangeHandler = Arc<dyn Fn(SessionEvent, Option<&Session>) + Send + Sync>;

/// Abstraction over the external authentication backend.
///
/// Implementations own the OAuth handshake, token storage and refresh.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Begin an interactive sign-in flow (usually a browser redirect).
    async fn start_oauth_sign_in(
        &self,
        provider: OAuthProvider,
        options: &SignInOptions,
    ) -> Result<()>;

    /// Look up the stored session, if any.
    async fn get_current_session(&self) -> Result<Option<Session>>;

    /// Register a handler for session changes. Dropping or unsubscribing the
    /// returned [`Subscription`] removes the handler.
    fn subscribe_to_session_changes(&self, handler: SessionChangeHandler) -> Subscription;
}
