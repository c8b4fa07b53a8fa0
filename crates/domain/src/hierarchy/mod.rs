//! Location hierarchy - snapshot algorithms and structural invariants
//!
//! A [`CampaignTree`] is an in-memory adjacency map built from one campaign's
//! locations. Every navigation query and every invariant check walks
//! `parent_id` links through it, so a single batch fetch answers any number
//! of questions about the tree.
//!
//! Invariants enforced for committed state:
//! 1. No location is its own ancestor
//! 2. Depth (root = 0) stays below [`MaxDepth`]
//! 3. A parent always lives in the same campaign
//!
//! Ancestor walks are bounded by `MaxDepth + 1` steps. Exceeding the bound,
//! or following a parent pointer that leads nowhere, yields a corrupt
//! [`HierarchyError`] instead of looping.

mod audit;
mod checks;
#[cfg(test)]
mod fixtures;
mod tree;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error::DomainError;
use crate::LocationId;

pub use audit::IntegrityIssue;
pub use checks::{crosses_campaign, violates_owner_campaign};
pub use tree::{CampaignTree, LocationPath, LocationTreeNode};

/// Default number of levels a campaign tree may have (depths 0..=9).
pub const DEFAULT_MAX_DEPTH: u8 = 10;

// ============================================================================
// MaxDepth
// ============================================================================

/// Number of levels a tree may have.
///
/// Depth values are zero-based, so the deepest legal depth is `levels - 1`.
/// With the default of 10 a chain of ten locations (depths 0..=9) is legal
/// and an eleventh is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MaxDepth(u8);

impl MaxDepth {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when `levels` is zero.
    pub fn new(levels: u8) -> Result<Self, DomainError> {
        if levels == 0 {
            return Err(DomainError::validation(
                "Maximum depth must allow at least one level",
            ));
        }
        Ok(Self(levels))
    }

    /// Number of levels, e.g. 10.
    pub fn levels(&self) -> usize {
        usize::from(self.0)
    }

    /// Deepest legal depth value, e.g. 9.
    pub fn deepest(&self) -> usize {
        self.levels() - 1
    }

    /// True when a node may sit at `depth`.
    pub fn allows(&self, depth: usize) -> bool {
        depth < self.levels()
    }

    /// Upper bound on ancestor-walk steps before the data is declared corrupt.
    pub fn walk_limit(&self) -> usize {
        self.levels() + 1
    }
}

impl Default for MaxDepth {
    fn default() -> Self {
        Self(DEFAULT_MAX_DEPTH)
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for MaxDepth {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MaxDepth> for u8 {
    fn from(value: MaxDepth) -> u8 {
        value.0
    }
}

// ============================================================================
// HierarchyError
// ============================================================================

/// Failures while walking a campaign snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// The requested location is not in the snapshot
    #[error("Location {0} is not part of this campaign")]
    UnknownLocation(LocationId),

    /// Ancestor walk did not reach a root within its bound
    #[error("Ancestor walk from {location_id} exceeded {limit} steps")]
    WalkLimitExceeded {
        location_id: LocationId,
        limit: usize,
    },

    /// A parent pointer references a location outside the snapshot
    #[error("Location {location_id} points at missing parent {parent_id}")]
    DanglingParent {
        location_id: LocationId,
        parent_id: LocationId,
    },

    /// A location is reachable from itself
    #[error("Location {location_id} is part of a parent cycle")]
    CycleDetected { location_id: LocationId },
}

impl HierarchyError {
    /// True for errors that mean the stored tree already violates its invariants.
    pub fn is_corrupt(&self) -> bool {
        !matches!(self, HierarchyError::UnknownLocation(_))
    }

    /// The location the walk started from or failed at.
    pub fn location_id(&self) -> LocationId {
        match self {
            HierarchyError::UnknownLocation(id) => *id,
            HierarchyError::WalkLimitExceeded { location_id, .. }
            | HierarchyError::DanglingParent { location_id, .. }
            | HierarchyError::CycleDetected { location_id } => *location_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_max_depth_allows_depths_zero_through_nine() {
        let max = MaxDepth::default();
        assert_eq!(max.levels(), 10);
        assert_eq!(max.deepest(), 9);
        assert!(max.allows(0));
        assert!(max.allows(9));
        assert!(!max.allows(10));
        assert_eq!(max.walk_limit(), 11);
    }

    #[test]
    fn zero_levels_rejected() {
        assert!(MaxDepth::new(0).is_err());
        assert!(serde_json::from_str::<MaxDepth>("0").is_err());
        assert_eq!(serde_json::from_str::<MaxDepth>("3").unwrap().levels(), 3);
    }

    #[test]
    fn unknown_location_is_not_corruption() {
        let id = LocationId::new();
        assert!(!HierarchyError::UnknownLocation(id).is_corrupt());
        assert!(HierarchyError::CycleDetected { location_id: id }.is_corrupt());
        assert_eq!(
            HierarchyError::WalkLimitExceeded {
                location_id: id,
                limit: 11
            }
            .location_id(),
            id
        );
    }
}
