//! Bearer token authentication: key material, token issuance and verification, and the
//! middleware that guards protected routes.

mod key;
mod middleware;
mod token;

pub use key::SigningKeys;
pub use middleware::{CurrentUser, auth_guard};
pub use token::{Claims, TOKEN_LIFETIME_SECONDS, TokenService};
