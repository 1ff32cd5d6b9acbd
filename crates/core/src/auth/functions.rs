use chrono::{DateTime, Utc};
use rand::{distr::Alphanumeric, Rng};

use super::Session;

/// Generate a random opaque access token.
pub fn generate_access_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Check if a session has expired. Sessions without an expiry never expire.
pub fn is_session_expired(session: &Session, now: DateTime<Utc>) -> bool {
    session
        .expires_at
        .map(|expires_at| expires_at <= now)
        .unwrap_or(false)
}

/// Extract username from email if no name provided.
pub fn email_to_name(email: &str) -> String {
    match email.split('@').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "User".to_string(),
    }
}
