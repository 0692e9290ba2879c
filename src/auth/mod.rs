//! Authentication: credentials, session tokens and the access gate.
//!
//! ## Architecture
//!
//! - `clock` - Injected time source for expiry checks
//! - `password` - Password digest
//! - `token` - Token Lifecycle Manager (issue / validate / authorize / refresh)
//! - `service` - Sign-up, sign-in and refresh operations
//! - `gate` - Access gate and its axum middleware
//!
//! Tokens are stateless and cannot be revoked; a refreshed token does not
//! invalidate the one it was exchanged for.

pub mod clock;
mod gate;
mod password;
mod service;
mod token;

pub use clock::SystemClock;
pub use gate::{bearer_token, require_session, AccessGate};
pub use password::password_digest;
pub use service::{AuthService, SignInRequest};
pub use token::{JwtSecret, SessionToken, TokenManager, TokenPolicy};
