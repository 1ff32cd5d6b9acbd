//! Observable state primitives.

mod observable;
mod subscription;

pub use observable::Observable;
pub use subscription::Subscription;
