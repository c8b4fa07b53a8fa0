//! Pure invariant checks for a proposed parent assignment.
//!
//! Callers run them in a fixed order: campaign checks, then the cycle check,
//! then the depth check. The first failure decides the reported error.

use super::{CampaignTree, HierarchyError};
use crate::aggregates::Location;
use crate::{CampaignId, LocationId};

impl CampaignTree {
    /// True if parenting `node_id` under `proposed_parent` would close a loop.
    pub fn would_create_cycle(
        &self,
        node_id: LocationId,
        proposed_parent: LocationId,
    ) -> Result<bool, HierarchyError> {
        if proposed_parent == node_id {
            return Ok(true);
        }
        Ok(self.ancestors(proposed_parent)?.contains(&node_id))
    }

    /// Depth a node would have under `proposed_parent`.
    pub fn resulting_depth(
        &self,
        proposed_parent: Option<LocationId>,
    ) -> Result<usize, HierarchyError> {
        match proposed_parent {
            None => Ok(0),
            Some(parent) => Ok(self.depth(parent)? + 1),
        }
    }

    /// True if a new leaf under `proposed_parent` would sit too deep.
    pub fn exceeds_max_depth(
        &self,
        proposed_parent: Option<LocationId>,
    ) -> Result<bool, HierarchyError> {
        let depth = self.resulting_depth(proposed_parent)?;
        Ok(!self.max_depth().allows(depth))
    }

    /// True if moving `node_id` (with its whole subtree) under
    /// `proposed_parent` would push any descendant too deep.
    pub fn move_exceeds_max_depth(
        &self,
        node_id: LocationId,
        proposed_parent: Option<LocationId>,
    ) -> Result<bool, HierarchyError> {
        let deepest =
            self.resulting_depth(proposed_parent)? + self.subtree_height(node_id)?;
        Ok(!self.max_depth().allows(deepest))
    }
}

/// True if `parent` lives in a different campaign than the node.
pub fn crosses_campaign(campaign_id: CampaignId, parent: &Location) -> bool {
    parent.campaign_id() != campaign_id
}

/// True if the owning character's campaign differs from the location's.
pub fn violates_owner_campaign(owner_campaign: CampaignId, campaign_id: CampaignId) -> bool {
    owner_campaign != campaign_id
}
