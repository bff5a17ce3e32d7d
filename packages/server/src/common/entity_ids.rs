//! Typed ID definitions for all domain entities.
//!
//! ```rust
//! use club_core::common::{ContactId, MemberId};
//!
//! let member_id: MemberId = MemberId::from_uuid(uuid::Uuid::new_v4());
//!
//! // This would be a compile error:
//! // let wrong: ContactId = member_id;
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Member entities (club participants).
pub struct Member;

/// Marker type for MemberContact entities (contacts owned by a member).
pub struct MemberContact;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Member entities.
pub type MemberId = Id<Member>;

/// Typed ID for MemberContact entities.
pub type ContactId = Id<MemberContact>;
