//! Auth domain - bearer token issuing and verification
//!
//! Tokens are HS256 JWTs signed with the configured secret. The HTTP gate
//! that enforces them lives in `server::middleware::jwt_auth`.

pub mod jwt;

pub use jwt::{Claims, JwtService};
