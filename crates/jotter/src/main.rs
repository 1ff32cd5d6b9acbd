use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use jotter_auth::{AuthConfig, InMemoryAuthService, SessionMirror};
use jotter_core::auth::{validate_redirect_to, OAuthProvider, Session, UserIdentity};
use jotter_core::notes::{Note, NoteDraft, NoteStores};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// jotter - sign in and keep notes
#[derive(Parser, Debug)]
#[command(name = "jotter")]
#[command(version, about, long_about = None)]
struct Cli {
    /// OAuth provider to sign in with (overrides AUTH_PROVIDER)
    #[arg(long, short)]
    provider: Option<OAuthProvider>,

    /// Redirect target after sign-in (overrides AUTH_REDIRECT_URL)
    #[arg(long)]
    redirect_to: Option<String>,

    /// Id of the user the in-memory service signs in
    #[arg(long, default_value = "demo-user", env = "JOTTER_USER_ID")]
    user_id: String,

    /// Email of the user the in-memory service signs in
    #[arg(long, env = "JOTTER_USER_EMAIL")]
    email: Option<String>,

    /// Start with a stored session, as if signed in on a previous run
    #[arg(long)]
    restore: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jotter=debug,jotter_auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = resolve_config(&cli)?;

    let mut user = UserIdentity::new(cli.user_id.clone());
    if let Some(email) = &cli.email {
        user = user.with_email(email.clone());
    }

    let service = if cli.restore {
        InMemoryAuthService::with_session(Session::new("restored-token", user.clone()))
    } else {
        InMemoryAuthService::new()
    };

    let session = SessionMirror::initialize(Arc::new(service.clone()), config).await?;
    let notes = NoteStores::new();

    let _announcer = session.user().subscribe(|user| match user {
        Some(user) => tracing::info!("Signed in as {}", user.display_name()),
        None => tracing::info!("Not signed in"),
    });

    // Signing out clears client-side note state.
    let reset_notes = notes.clone();
    let _reset_on_sign_out = session.user().subscribe(move |user| {
        if user.is_none() {
            reset_notes.reset();
        }
    });

    if !session.is_authenticated() {
        session.initiate_default_sign_in().await;
        // The in-memory service never redirects; complete the flow by hand.
        service.sign_in_as(user).await;
    }

    notes
        .all
        .update(|all| all.push(Note::new("welcome", "Welcome").with_content("First jot")));
    if let Some(first) = notes.all.get().into_iter().next() {
        notes.current.set(NoteDraft::from(first));
    }
    tracing::info!(
        notes = notes.all.get().len(),
        current = %notes.current.get().title,
        "Notes loaded"
    );

    service.refresh_token().await;
    service.sign_out().await;
    tracing::info!(notes = notes.all.get().len(), "Notes after sign-out");

    session.unsubscribe();
    Ok(())
}

/// Environment config with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<AuthConfig> {
    resolve_config_from(cli, |key| std::env::var(key).ok())
}

/// Config read through `lookup`, with command-line overrides applied.
fn resolve_config_from(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AuthConfig> {
    let mut config = AuthConfig::from_lookup(lookup)?;

    if let Some(provider) = cli.provider {
        config.provider = provider;
    }

    if let Some(redirect_to) = &cli.redirect_to {
        config.redirect_to = Some(
            validate_redirect_to(redirect_to)
                .ok_or_else(|| anyhow::anyhow!("invalid --redirect-to: {}", redirect_to))?,
        );
    }

    Ok(config)
}
