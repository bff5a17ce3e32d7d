//! Member domain - club member records
//!
//! Handlers in `server::routes::members` call straight into the model layer;
//! every store call is a bound-parameter query against PostgreSQL.

pub mod models;

// Re-export commonly used types
pub use models::{CreateMember, Gender, Member, MemberField, MemberPatch, MemberProfile, PatchError};
