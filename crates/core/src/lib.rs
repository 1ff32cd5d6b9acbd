//! Functional core for jotter.
//!
//! - `auth`: identity and session types, the `AuthService` abstraction
//! - `store`: the `Observable` cell used for all client-side state
//! - `notes`: note records and the note state holders

pub mod auth;
pub mod notes;
pub mod serde;
pub mod store;
