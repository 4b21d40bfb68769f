//! Authentication and authorization module

pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use jwt::{AccessClaims, JwtService, RefreshClaims};
pub use middleware::{extract_token, jwt_auth_middleware, verify_access, AuthContext};
pub use password::PasswordHasher;
pub use policy::authorize_mutation;
