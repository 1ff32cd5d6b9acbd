//! Mirrors the auth service's session into an observable slot.
//!
//! The slot is the single source of truth for "who is signed in" on the
//! client. It is written only from session change notifications and from the
//! initial session lookup; starting a sign-in never writes it directly.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use jotter_core::auth::{
    AuthService, AuthStatus, OAuthProvider, Session, SessionChangeHandler, SessionEvent,
    SignInOptions, UserIdentity,
};
use jotter_core::store::{Observable, Subscription};
use tracing::{debug, error, info};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Keeps an [`Observable`] in sync with an [`AuthService`]'s session.
#[derive(Clone)]
pub struct SessionMirror {
    service: Arc<dyn AuthService>,
    user: Observable<Option<UserIdentity>>,
    /// Number of change notifications applied so far.
    changes: Arc<AtomicU64>,
    config: AuthConfig,
}

impl SessionMirror {
    /// Creates a mirror whose slot reads `None`. Nothing is registered with
    /// the service until [`SessionMirror::attach`] is called.
    pub fn new(service: Arc<dyn AuthService>, config: AuthConfig) -> Self {
        Self {
            service,
            user: Observable::new(None),
            changes: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// Registers the change listener with the service.
    pub fn attach(self) -> SessionHandle {
        let user = self.user.clone();
        let changes = self.changes.clone();
        let handler: SessionChangeHandler =
            Arc::new(move |event: SessionEvent, session: Option<&Session>| {
                apply_session_change(&user, &changes, event, session);
            });

        let subscription = self.service.subscribe_to_session_changes(handler);
        debug!("Session mirror attached");

        SessionHandle {
            mirror: self,
            subscription,
        }
    }

    /// Attaches to `service` and loads the stored session.
    ///
    /// This is the startup entry point. Use [`SessionMirror::attach`] and
    /// [`SessionMirror::initialize_session`] separately to keep the handle
    /// when the lookup fails.
    ///
    /// # Errors
    ///
    /// Returns the service's error if the session lookup fails.
    pub async fn initialize(
        service: Arc<dyn AuthService>,
        config: AuthConfig,
    ) -> Result<SessionHandle, AuthError> {
        let handle = Self::new(service, config).attach();
        handle.initialize_session().await?;
        Ok(handle)
    }

    /// Loads the stored session into the slot. Run once at startup.
    ///
    /// A change notification that arrives while the lookup is in flight is
    /// newer than the lookup result, so the result is discarded in that case.
    ///
    /// # Errors
    ///
    /// Logs and returns the service's error; the slot is left untouched.
    pub async fn initialize_session(&self) -> Result<(), AuthError> {
        let changes_before = self.changes.load(Ordering::SeqCst);

        let session = match self.service.get_current_session().await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "Failed to load current session");
                return Err(e.into());
            }
        };

        let user = session.map(|session| session.user);
        let user_id = user.as_ref().map(|user| user.id.clone());

        // Notifications bump the counter before writing the slot, so checking
        // it under the slot's write lock orders this write before theirs.
        let changes = &self.changes;
        let applied = self.user.update_if(|slot| {
            if changes.load(Ordering::SeqCst) != changes_before {
                return false;
            }
            *slot = user;
            true
        });

        match (applied, user_id) {
            (false, _) => debug!("Session changed during initial lookup, keeping newer state"),
            (true, Some(user_id)) => info!(user_id = %user_id, "Restored session"),
            (true, None) => debug!("No stored session"),
        }
        Ok(())
    }

    /// Asks the service to start an interactive sign-in with `provider`.
    ///
    /// Failures are logged and swallowed; the slot only changes later, when
    /// the service reports the new session.
    pub async fn initiate_sign_in(&self, provider: OAuthProvider) {
        info!(provider = %provider, "Starting OAuth sign-in");

        if let Err(e) = self
            .service
            .start_oauth_sign_in(provider, &self.sign_in_options())
            .await
        {
            error!(provider = %provider, error = %e, "OAuth sign-in failed");
        }
    }

    /// Starts a sign-in with the configured default provider.
    pub async fn initiate_default_sign_in(&self) {
        self.initiate_sign_in(self.config.provider).await;
    }

    /// Applies a session change. The event kind does not matter: the slot
    /// becomes the session's identity, or `None` without a session.
    pub fn on_session_changed(&self, event: SessionEvent, session: Option<&Session>) {
        apply_session_change(&self.user, &self.changes, event, session);
    }

    /// The observable "who is signed in" slot.
    pub fn user(&self) -> &Observable<Option<UserIdentity>> {
        &self.user
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.user.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.get().is_some()
    }

    pub fn status(&self) -> AuthStatus {
        AuthStatus::from(self.user.get())
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn sign_in_options(&self) -> SignInOptions {
        self.config.sign_in_options()
    }
}

fn apply_session_change(
    user: &Observable<Option<UserIdentity>>,
    changes: &AtomicU64,
    event: SessionEvent,
    session: Option<&Session>,
) {
    changes.fetch_add(1, Ordering::SeqCst);

    let identity = session.map(|session| session.identity().clone());
    debug!(
        event = %event,
        user_id = ?identity.as_ref().map(|user| user.id.as_str()),
        "Session changed"
    );
    user.set(identity);
}

/// A [`SessionMirror`] that is registered with its auth service.
///
/// Pass this (or clones of [`SessionMirror::user`]) to whatever needs to know
/// who is signed in. Dropping the handle detaches it from the service.
pub struct SessionHandle {
    mirror: SessionMirror,
    subscription: Subscription,
}

impl SessionHandle {
    pub fn mirror(&self) -> &SessionMirror {
        &self.mirror
    }

    /// Detaches from the auth service. The slot keeps its last value.
    pub fn unsubscribe(self) {
        let SessionHandle { subscription, .. } = self;
        subscription.unsubscribe();
        debug!("Session mirror detached");
    }
}

impl Deref for SessionHandle {
    type Target = SessionMirror;

    fn deref(&self) -> &Self::Target {
        &self.mirror
    }
}
