//! Authentication: password hashing, token issuance and request middleware

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::{TokenError, TokenService};
pub use middleware::{authenticate, bearer_token, require_auth};
pub use models::{AuthUser, Claims, TokenPair, TokenPayload};
pub use password::PasswordHasher;
