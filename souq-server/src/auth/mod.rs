//! Authentication: identity provider client, session cookies, route gates

pub mod claims;
pub mod gate;
pub mod pkce;
pub mod provider;
pub mod rate_limit;
pub mod session;

pub use provider::AuthUser;
pub use session::CurrentSession;
