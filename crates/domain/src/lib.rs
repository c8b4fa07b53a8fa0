extern crate self as atlas_domain;

pub mod aggregates;
pub mod error;
pub mod events;
pub mod hierarchy;
pub mod ids;
pub mod types;
pub mod value_objects;

pub use aggregates::Location;

pub use error::DomainError;
pub use events::LocationMutated;

// Re-export hierarchy algorithms
pub use hierarchy::{
    crosses_campaign, violates_owner_campaign, CampaignTree, HierarchyError, IntegrityIssue,
    LocationPath, LocationTreeNode, MaxDepth, DEFAULT_MAX_DEPTH,
};

// Re-export ID types
pub use ids::{CampaignId, CharacterId, LocationId, UserId};

pub use types::{
    CampaignRole, DefaultPermissionPolicy, LocationAction, NodeRelationship, PermissionPolicy,
};

pub use value_objects::{
    Description, LocationName, TextError, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
};
