//! In-memory auth service for development and testing.
//!
//! Stands in for a hosted auth backend: it keeps the "stored" session in
//! memory, records sign-in requests instead of redirecting, and lets callers
//! drive session changes by hand.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use jotter_core::auth::{
    generate_access_token, is_session_expired, AuthError, AuthService, OAuthProvider, Result,
    Session, SessionChangeHandler, SessionEvent, SignInOptions, UserIdentity,
};
use jotter_core::store::Subscription;

/// Lifetime of sessions issued by [`InMemoryAuthService::sign_in_as`], in seconds.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60;

/// A sign-in flow that was requested from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub provider: OAuthProvider,
    pub options: SignInOptions,
}

#[derive(Default)]
struct Handlers {
    next_id: u64,
    entries: Vec<(u64, SessionChangeHandler)>,
}

#[derive(Default)]
struct Failures {
    sign_in: Option<String>,
    session_lookup: Option<String>,
}

#[derive(Default)]
struct Inner {
    session: RwLock<Option<Session>>,
    handlers: Mutex<Handlers>,
    sign_in_requests: Mutex<Vec<SignInRequest>>,
    failures: Mutex<Failures>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory auth service.
///
/// Clones share the same state, so a test can keep one clone to drive
/// session changes while the code under test holds another.
#[derive(Clone, Default)]
pub struct InMemoryAuthService {
    inner: Arc<Inner>,
}

impl InMemoryAuthService {
    /// Creates a service with no stored session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service that already has a stored session, as if the user
    /// signed in during a previous run.
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: RwLock::new(Some(session)),
                ..Inner::default()
            }),
        }
    }

    /// Completes a sign-in for `user` and notifies subscribers.
    pub async fn sign_in_as(&self, user: UserIdentity) -> Session {
        let session = Session::new(generate_access_token(), user)
            .with_expiry(Utc::now() + Duration::seconds(DEFAULT_SESSION_TTL_SECS));
        *self.inner.session.write().await = Some(session.clone());

        info!(user_id = %session.user.id, "Signed in");
        self.emit(SessionEvent::SignedIn, Some(&session));
        session
    }

    /// Issues a fresh token for the stored session and notifies subscribers.
    ///
    /// Returns `None` without notifying when nobody is signed in.
    pub async fn refresh_token(&self) -> Option<Session> {
        let refreshed = {
            let mut stored = self.inner.session.write().await;
            let session = stored.as_mut()?;
            session.access_token = generate_access_token();
            session.expires_at = Some(Utc::now() + Duration::seconds(DEFAULT_SESSION_TTL_SECS));
            session.clone()
        };

        debug!(user_id = %refreshed.user.id, "Token refreshed");
        self.emit(SessionEvent::TokenRefreshed, Some(&refreshed));
        Some(refreshed)
    }

    /// Replaces the identity on the stored session and notifies subscribers.
    ///
    /// Returns `None` without notifying when nobody is signed in.
    pub async fn update_user(&self, user: UserIdentity) -> Option<Session> {
        let updated = {
            let mut stored = self.inner.session.write().await;
            let session = stored.as_mut()?;
            session.user = user;
            session.clone()
        };

        self.emit(SessionEvent::UserUpdated, Some(&updated));
        Some(updated)
    }

    /// Clears the stored session and notifies subscribers.
    pub async fn sign_out(&self) {
        *self.inner.session.write().await = None;

        info!("Signed out");
        self.emit(SessionEvent::SignedOut, None);
    }

    /// Delivers a session change to every subscriber without touching the
    /// stored session.
    pub fn emit(&self, event: SessionEvent, session: Option<&Session>) {
        let handlers: Vec<SessionChangeHandler> = lock(&self.inner.handlers)
            .entries
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        debug!(event = %event, subscribers = handlers.len(), "Emitting session change");
        for handler in handlers {
            handler(event, session);
        }
    }

    /// Makes every following sign-in attempt fail with `message`.
    pub fn fail_sign_in(&self, message: impl Into<String>) {
        lock(&self.inner.failures).sign_in = Some(message.into());
    }

    /// Makes every following session lookup fail with `message`.
    pub fn fail_session_lookup(&self, message: impl Into<String>) {
        lock(&self.inner.failures).session_lookup = Some(message.into());
    }

    /// Removes any injected failures.
    pub fn clear_failures(&self) {
        *lock(&self.inner.failures) = Failures::default();
    }

    /// Every sign-in flow requested so far, oldest first.
    pub fn sign_in_requests(&self) -> Vec<SignInRequest> {
        lock(&self.inner.sign_in_requests).clone()
    }

    /// Number of registered session change handlers.
    pub fn handler_count(&self) -> usize {
        lock(&self.inner.handlers).entries.len()
    }
}

#[async_trait]
impl AuthService for InMemoryAuthService {
    async fn start_oauth_sign_in(
        &self,
        provider: OAuthProvider,
        options: &SignInOptions,
    ) -> Result<()> {
        lock(&self.inner.sign_in_requests).push(SignInRequest {
            provider,
            options: options.clone(),
        });

        if let Some(message) = lock(&self.inner.failures).sign_in.clone() {
            return Err(AuthError::SignIn(message));
        }

        debug!(provider = %provider, "Sign-in redirect issued");
        Ok(())
    }

    async fn get_current_session(&self) -> Result<Option<Session>> {
        if let Some(message) = lock(&self.inner.failures).session_lookup.clone() {
            return Err(AuthError::SessionLookup(message));
        }

        let stored = self.inner.session.read().await;
        match stored.as_ref() {
            Some(session) if is_session_expired(session, Utc::now()) => {
                debug!(user_id = %session.user.id, "Stored session expired");
                Ok(None)
            }
            other => Ok(other.cloned()),
        }
    }

    fn subscribe_to_session_changes(&self, handler: SessionChangeHandler) -> Subscription {
        let id = {
            let mut handlers = lock(&self.inner.handlers);
            let id = handlers.next_id;
            handlers.next_id += 1;
            handlers.entries.push((id, handler));
            id
        };

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner.handlers)
                    .entries
                    .retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }
}
