//! Authentication: identity provider, session hook and sign-in routes

pub mod extract;
pub mod handlers;
pub mod identity;
pub mod session;

pub use extract::{Auth, bearer_token};
pub use identity::{Account, IdentityProvider, InMemoryIdentityProvider, Session, SessionEvent};
pub use session::SessionHook;
