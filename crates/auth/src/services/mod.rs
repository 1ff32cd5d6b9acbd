//! Auth service implementations.
//!
//! Provides `AuthService` implementations for:
//! - In-memory (with `mock` feature)

#[cfg(any(test, feature = "mock"))]
mod inmemory;

#[cfg(any(test, feature = "mock"))]
pub use inmemory::{InMemoryAuthService, SignInRequest};
