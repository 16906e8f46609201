//! HTTP middleware.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Session layer (tower-sessions, `sp_session` cookie)
//!
//! Authentication is enforced per handler through the extractors in [`auth`].

pub mod auth;
pub mod session;

pub use auth::{
    AuthRejection, OptionalUser, RequireAdmin, RequireAuth, RequireSalon, clear_current_user,
    set_current_user,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer};
