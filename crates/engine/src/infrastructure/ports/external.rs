//! Collaborator ports owned by other subsystems.

use async_trait::async_trait;
use atlas_domain::{CampaignId, CampaignRole, CharacterId, LocationMutated, UserId};

use super::error::RepoError;
use super::types::CharacterRef;

// =============================================================================
// Campaigns & Characters
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignDirectory: Send + Sync {
    async fn campaign_exists(&self, campaign_id: CampaignId) -> Result<bool, RepoError>;

    /// The user's role in the campaign; `CampaignRole::None` for non-members.
    async fn resolve_role(
        &self,
        user_id: UserId,
        campaign_id: CampaignId,
    ) -> Result<CampaignRole, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterDirectory: Send + Sync {
    async fn get_character(&self, id: CharacterId) -> Result<Option<CharacterRef>, RepoError>;
}

// =============================================================================
// Notifications
// =============================================================================

/// Fire-and-forget hook called once per committed mutation.
#[cfg_attr(test, mockall::automock)]
pub trait LocationEventSink: Send + Sync {
    fn location_mutated(&self, event: LocationMutated);
}
