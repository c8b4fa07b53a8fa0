//! Permission checks for location writes.

use std::sync::Arc;

use atlas_domain::{
    CampaignId, CampaignRole, Location, LocationAction, LocationId, NodeRelationship,
    PermissionPolicy, UserId,
};

use super::error::LocationError;
use crate::infrastructure::ports::{CampaignDirectory, CharacterDirectory};

/// Resolves an actor's role and relationship, then asks the policy.
pub struct LocationAccess {
    campaigns: Arc<dyn CampaignDirectory>,
    characters: Arc<dyn CharacterDirectory>,
    policy: Arc<dyn PermissionPolicy>,
}

impl LocationAccess {
    pub fn new(
        campaigns: Arc<dyn CampaignDirectory>,
        characters: Arc<dyn CharacterDirectory>,
        policy: Arc<dyn PermissionPolicy>,
    ) -> Self {
        Self {
            campaigns,
            characters,
            policy,
        }
    }

    /// The actor's role in an existing campaign.
    pub async fn role(
        &self,
        actor: UserId,
        campaign_id: CampaignId,
    ) -> Result<CampaignRole, LocationError> {
        if !self.campaigns.campaign_exists(campaign_id).await? {
            return Err(LocationError::not_found("Campaign", campaign_id));
        }
        Ok(self.campaigns.resolve_role(actor, campaign_id).await?)
    }

    pub async fn relationship(
        &self,
        actor: UserId,
        location: &Location,
    ) -> Result<NodeRelationship, LocationError> {
        let owned_via_character = match location.owned_by() {
            Some(owner) => self
                .characters
                .get_character(owner)
                .await?
                .is_some_and(|c| c.is_controlled_by(actor)),
            None => false,
        };
        Ok(NodeRelationship {
            created_by_actor: location.created_by() == actor,
            owned_via_character,
        })
    }

    /// Fail with `PermissionDenied` unless the policy allows the action.
    pub fn authorize(
        &self,
        role: CampaignRole,
        action: LocationAction,
        relationship: NodeRelationship,
        location_id: Option<LocationId>,
    ) -> Result<(), LocationError> {
        if self.policy.allows(role, action, relationship) {
            return Ok(());
        }
        tracing::debug!(
            role = ?role,
            action = %action,
            location_id = ?location_id,
            "Location permission denied"
        );
        Err(LocationError::permission_denied(action, location_id))
    }

    /// Full check for an existing location.
    pub async fn check_location(
        &self,
        actor: UserId,
        role: CampaignRole,
        action: LocationAction,
        location: &Location,
    ) -> Result<(), LocationError> {
        let relationship = self.relationship(actor, location).await?;
        self.authorize(role, action, relationship, Some(location.id()))
    }
}
