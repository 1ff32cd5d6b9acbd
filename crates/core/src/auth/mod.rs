mod error;
mod functions;
mod traits;
mod types;
mod validation;

pub use error::AuthError;
pub use functions::{email_to_name, generate_access_token, is_session_expired};
pub use traits::{AuthService, Result, SessionChangeHandler};
pub use types::{
    AuthStatus, OAuthProvider, Session, SessionEvent, SignInOptions, UserIdentity,
};
pub use validation::validate_redirect_to;
