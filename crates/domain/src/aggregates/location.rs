//! Location aggregate - Places in a campaign, arranged as a tree
//!
//! # Parent-pointer hierarchy
//!
//! A location knows only its own `parent_id`. The tree is never embedded as
//! nested objects: every traversal walks `parent_id` links through a
//! [`CampaignTree`](crate::hierarchy::CampaignTree) snapshot or the store.
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: All fields are encapsulated
//! - **Newtypes**: `LocationName` and `Description` for validated strings
//! - **Valid by construction**: `new()` takes pre-validated types
//! - **Builder pattern**: Fluent API for optional fields
//!
//! Structural invariants (acyclicity, depth, same-campaign parent) span more
//! than one aggregate and are checked by the hierarchy module, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Description, LocationName};
use crate::{CampaignId, CharacterId, LocationId, UserId};

/// A location in a campaign
///
/// # Invariants
///
/// - `name` is always non-empty and <= 200 characters (enforced by `LocationName`)
/// - `description` is always <= 5000 characters (enforced by `Description`)
/// - `campaign_id` never changes after construction (no setter exists)
/// - a location is never its own parent
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use atlas_domain::{CampaignId, Location, LocationName, UserId};
///
/// let campaign_id = CampaignId::new();
/// let name = LocationName::new("The Prancing Pony").unwrap();
/// let location = Location::new(campaign_id, name, UserId::new(), Utc::now());
///
/// assert_eq!(location.name().as_str(), "The Prancing Pony");
/// assert!(location.is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    // Identity
    id: LocationId,
    campaign_id: CampaignId,

    // Core attributes (newtypes)
    name: LocationName,
    description: Description,

    // Hierarchy
    parent_id: Option<LocationId>,

    /// Character (NPC or PC) that owns this place, if any
    owned_by: Option<CharacterId>,

    // Provenance
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Location {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create a new root location with no description and no owner.
    pub fn new(
        campaign_id: CampaignId,
        name: LocationName,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LocationId::new(),
            campaign_id,
            name,
            description: Description::empty(),
            parent_id: None,
            owned_by: None,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> LocationId {
        self.id
    }

    /// Returns the ID of the campaign this location belongs to.
    #[inline]
    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    #[inline]
    pub fn name(&self) -> &LocationName {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Returns the parent location, or `None` for a root.
    #[inline]
    pub fn parent_id(&self) -> Option<LocationId> {
        self.parent_id
    }

    #[inline]
    pub fn owned_by(&self) -> Option<CharacterId> {
        self.owned_by
    }

    #[inline]
    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when the location has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    // =========================================================================
    // Builder Methods (for construction)
    // =========================================================================

    /// Set the location's ID (used when loading from storage).
    pub fn with_id(mut self, id: LocationId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    pub fn with_parent(mut self, parent_id: Option<LocationId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_owner(mut self, owned_by: Option<CharacterId>) -> Self {
        self.owned_by = owned_by;
        self
    }

    /// Set the last-modified timestamp (used when loading from storage).
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    // =========================================================================
    // Mutation Methods
    // =========================================================================

    pub fn set_name(&mut self, name: LocationName) {
        self.name = name;
    }

    pub fn set_description(&mut self, description: Description) {
        self.description = description;
    }

    /// Reassign the parent. Tree invariants must be checked by the caller
    /// against a campaign snapshot before committing.
    pub fn set_parent(&mut self, parent_id: Option<LocationId>) {
        self.parent_id = parent_id;
    }

    pub fn set_owner(&mut self, owned_by: Option<CharacterId>) {
        self.owned_by = owned_by;
    }

    /// Record a modification time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// ============================================================================
// Tests
// ============================================================================
