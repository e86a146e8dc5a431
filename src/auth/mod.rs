//! Account registration, login and logout.
//!
//! Handlers validate form input, delegate credential checks to
//! [`AuthService`], and keep the authenticated user in the server-side
//! session behind [`session_middleware`]. A signed token with the user's identity is handed out in
//! the `token` cookie alongside it.

pub mod handlers;
pub mod password;
pub mod service;
pub mod session;
pub mod token;
pub mod validation;

pub use service::{AuthService, LoginSuccess};
pub use session::{session_middleware, MemorySessionStore, SESSION_COOKIE};
pub use token::{Claims, TokenIssuer};
pub use validation::{LoginForm, SignUpForm, Validate, Violation, Violations};
