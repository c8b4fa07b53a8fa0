//! # Atlas Domain Types
//!
//! Shared vocabulary types used by the domain and by every engine layer.
//!
//! ## Design Principles
//!
//! 1. **Pure data types** - No I/O, no async, no side effects
//! 2. **Serializable** - All types derive Serialize/Deserialize

// Membership roles
mod session;
pub use session::CampaignRole;

// Authorization predicates
mod permissions;
pub use permissions::{DefaultPermissionPolicy, LocationAction, NodeRelationship, PermissionPolicy};
