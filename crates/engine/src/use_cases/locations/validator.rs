//! Invariant validation for proposed location writes.
//!
//! Checks run in a fixed order and the first failure wins:
//! campaign containment (parent, then owner) -> cycle -> depth -> name
//! uniqueness. Name and description shape are checked earlier, when the raw
//! input is parsed.

use std::sync::Arc;

use atlas_domain::{
    crosses_campaign, violates_owner_campaign, CampaignId, CampaignTree, CharacterId, Description,
    LocationId, LocationName,
};

use super::error::{LocationError, ValidationField, ValidationReason};
use crate::infrastructure::ports::{CharacterDirectory, LocationRepo};

/// The fields of a write that invariants care about.
///
/// `None` means "not changing"; `Some(None)` clears a parent or owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// The node being written; `None` for a node that does not exist yet
    pub node_id: Option<LocationId>,
    pub name: Option<LocationName>,
    pub parent: Option<Option<LocationId>>,
    pub owner: Option<Option<CharacterId>>,
}

impl Placement {
    pub fn new_node(
        name: LocationName,
        parent: Option<LocationId>,
        owner: Option<CharacterId>,
    ) -> Self {
        Self {
            node_id: None,
            name: Some(name),
            parent: Some(parent),
            owner: Some(owner),
        }
    }

    pub fn existing(node_id: LocationId) -> Self {
        Self {
            node_id: Some(node_id),
            ..Self::default()
        }
    }

    /// True when nothing invariant-relevant changes.
    pub fn is_noop(&self) -> bool {
        self.name.is_none() && self.parent.is_none() && self.owner.is_none()
    }
}

pub fn parse_name(raw: &str) -> Result<LocationName, LocationError> {
    LocationName::new(raw).map_err(|e| LocationError::text(ValidationField::Name, e))
}

pub fn parse_description(raw: Option<String>) -> Result<Description, LocationError> {
    match raw {
        Some(text) => Description::new(text)
            .map_err(|e| LocationError::text(ValidationField::Description, e)),
        None => Ok(Description::empty()),
    }
}

/// Runs every structural check for a write against one campaign snapshot.
pub struct LocationValidator {
    locations: Arc<dyn LocationRepo>,
    characters: Arc<dyn CharacterDirectory>,
}

impl LocationValidator {
    pub fn new(locations: Arc<dyn LocationRepo>, characters: Arc<dyn CharacterDirectory>) -> Self {
        Self {
            locations,
            characters,
        }
    }

    /// Validate `placement` against `tree`, the snapshot the write will commit on.
    pub async fn validate(
        &self,
        tree: &CampaignTree,
        placement: &Placement,
    ) -> Result<(), LocationError> {
        let campaign_id = tree.campaign_id();

        if let Some(Some(parent_id)) = placement.parent {
            self.check_parent_campaign(tree, parent_id).await?;
        }
        if let Some(Some(owner_id)) = placement.owner {
            self.check_owner_campaign(campaign_id, owner_id).await?;
        }

        if let Some(parent) = placement.parent {
            if let (Some(node_id), Some(parent_id)) = (placement.node_id, parent) {
                if tree.would_create_cycle(node_id, parent_id)? {
                    tracing::debug!(location_id = %node_id, parent_id = %parent_id, "Rejected cycle");
                    return Err(LocationError::validation(
                        ValidationField::Parent,
                        ValidationReason::Cycle,
                    ));
                }
            }

            let too_deep = match placement.node_id {
                Some(node_id) => tree.move_exceeds_max_depth(node_id, parent)?,
                None => tree.exceeds_max_depth(parent)?,
            };
            if too_deep {
                tracing::debug!(
                    campaign_id = %campaign_id,
                    max_depth = %tree.max_depth(),
                    "Rejected placement past maximum depth"
                );
                return Err(LocationError::validation(
                    ValidationField::Parent,
                    ValidationReason::MaxDepthExceeded,
                ));
            }
        }

        if let Some(name) = &placement.name {
            let taken = tree
                .locations()
                .any(|l| l.name() == name && Some(l.id()) != placement.node_id);
            if taken {
                return Err(LocationError::validation(
                    ValidationField::Name,
                    ValidationReason::Duplicate,
                ));
            }
        }

        Ok(())
    }

    async fn check_parent_campaign(
        &self,
        tree: &CampaignTree,
        parent_id: LocationId,
    ) -> Result<(), LocationError> {
        // The snapshot only holds this campaign's rows.
        if tree.contains(parent_id) {
            return Ok(());
        }

        // Not in this campaign's snapshot: either missing or foreign.
        match self.locations.get(parent_id).await? {
            Some(parent) if crosses_campaign(tree.campaign_id(), &parent) => {
                Err(cross_campaign(ValidationField::Parent))
            }
            _ => Err(LocationError::not_found("Location", parent_id)),
        }
    }

    async fn check_owner_campaign(
        &self,
        campaign_id: CampaignId,
        owner_id: CharacterId,
    ) -> Result<(), LocationError> {
        let owner = self
            .characters
            .get_character(owner_id)
            .await?
            .ok_or_else(|| LocationError::not_found("Character", owner_id))?;
        if violates_owner_campaign(owner.campaign_id, campaign_id) {
            return Err(cross_campaign(ValidationField::OwnedBy));
        }
        Ok(())
    }
}

fn cross_campaign(field: ValidationField) -> LocationError {
    LocationError::validation(field, ValidationReason::CrossCampaign)
}
