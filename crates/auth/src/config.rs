use jotter_core::auth::{validate_redirect_to, OAuthProvider, SignInOptions};
use url::Url;

use crate::error::AuthError;

/// Client-side auth configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Provider used when the UI doesn't ask for a specific one.
    pub provider: OAuthProvider,
    /// Where the identity provider should send the browser after sign-in.
    pub redirect_to: Option<Url>,
    /// Extra provider scopes, space separated.
    pub scopes: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: OAuthProvider::Github,
            redirect_to: None,
            scopes: None,
        }
    }
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_PROVIDER`: Default OAuth provider (default: `github`)
    /// - `AUTH_REDIRECT_URL`: Redirect target after sign-in (optional)
    /// - `AUTH_SCOPES`: Extra provider scopes (optional)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the provider is unknown or the redirect
    /// URL is not an acceptable redirect target.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let provider = match var("AUTH_PROVIDER") {
            Some(value) => value
                .parse::<OAuthProvider>()
                .map_err(|e| AuthError::Config(format!("AUTH_PROVIDER: {}", e)))?,
            None => OAuthProvider::Github,
        };

        let redirect_to = match var("AUTH_REDIRECT_URL") {
            Some(value) => Some(validate_redirect_to(&value).ok_or_else(|| {
                AuthError::Config(format!(
                    "AUTH_REDIRECT_URL is not a valid redirect target: {}",
                    value
                ))
            })?),
            None => None,
        };

        Ok(Self {
            provider,
            redirect_to,
            scopes: var("AUTH_SCOPES"),
        })
    }

    /// Options forwarded to the auth service on every sign-in.
    pub fn sign_in_options(&self) -> SignInOptions {
        SignInOptions {
            redirect_to: self.redirect_to.clone(),
            scopes: self.scopes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = AuthConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, AuthConfig::default());
        assert_eq!(config.provider, OAuthProvider::Github);
        assert_eq!(config.sign_in_options(), SignInOptions::default());
    }

    #[test]
    fn test_all_values() {
        let config = AuthConfig::from_lookup(lookup(&[
            ("AUTH_PROVIDER", "Google"),
            ("AUTH_REDIRECT_URL", "http://localhost:5173/auth/callback"),
            ("AUTH_SCOPES", "read:user user:email"),
        ]))
        .unwrap();

        assert_eq!(config.provider, OAuthProvider::Google);
        let options = config.sign_in_options();
        assert_eq!(
            options.redirect_to.unwrap().as_str(),
            "http://localhost:5173/auth/callback"
        );
        assert_eq!(options.scopes.as_deref(), Some("read:user user:email"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = AuthConfig::from_lookup(lookup(&[
            ("AUTH_PROVIDER", ""),
            ("AUTH_SCOPES", "  "),
        ]))
        .unwrap();

        assert_eq!(config, AuthConfig::default());
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let error = AuthConfig::from_lookup(lookup(&[("AUTH_PROVIDER", "myspace")]))
            .unwrap_err();

        assert!(matches!(error, AuthError::Config(_)));
        assert!(error.to_string().contains("myspace"));
    }

    #[test]
    fn test_unsafe_redirect_is_config_error() {
        let error = AuthConfig::from_lookup(lookup(&[(
            "AUTH_REDIRECT_URL",
            "javascript:alert(1)",
        )]))
        .unwrap_err();

        assert!(matches!(error, AuthError::Config(_)));
    }
}
