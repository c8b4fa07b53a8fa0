//! Campaign membership roles
//!
//! Roles are resolved by an external collaborator; the engine only consumes them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

/// Role of a user in a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignRole {
    /// Created the campaign - full control
    Owner,
    /// Game master - full control over campaign content
    Gm,
    /// Player - may create places and manage the ones they own
    Player,
    /// Observer - read-only
    Observer,
    /// Not a member of the campaign
    #[default]
    None,
}

impl CampaignRole {
    /// Check if this role has full control over campaign content (Owner or GM)
    pub fn is_game_master(&self) -> bool {
        matches!(self, CampaignRole::Owner | CampaignRole::Gm)
    }
}

impl std::fmt::Display for CampaignRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignRole::Owner => write!(f, "OWNER"),
            CampaignRole::Gm => write!(f, "GM"),
            CampaignRole::Player => write!(f, "PLAYER"),
            CampaignRole::Observer => write!(f, "OBSERVER"),
            CampaignRole::None => write!(f, "NONE"),
        }
    }
}

impl FromStr for CampaignRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OWNER" => Ok(CampaignRole::Owner),
            "GM" => Ok(CampaignRole::Gm),
            "PLAYER" => Ok(CampaignRole::Player),
            "OBSERVER" => Ok(CampaignRole::Observer),
            "NONE" | "" => Ok(CampaignRole::None),
            other => Err(DomainError::parse(format!("Unknown campaign role: {}", other))),
        }
    }
}
