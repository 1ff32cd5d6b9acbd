//! Client-side authentication for jotter.
//!
//! This crate provides:
//! - `SessionMirror`, which keeps an observable "who is signed in" slot in
//!   sync with an external auth service
//! - Auth configuration loaded from the environment
//! - An in-memory auth service (with the `mock` feature)

mod config;
mod error;
mod mirror;
mod services;
#[cfg(test)]
mod test_support;

pub use config::AuthConfig;
pub use error::AuthError;
pub use mirror::{SessionHandle, SessionMirror};
#[cfg(feature = "mock")]
pub use services::{InMemoryAuthService, SignInRequest};
