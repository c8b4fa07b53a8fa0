//! Permission predicates for location mutations
//!
//! Authorization is a pure function of `(role, action, relationship)`. The
//! engine receives a [`PermissionPolicy`] as a dependency and never branches
//! on roles itself.

use serde::{Deserialize, Serialize};

use super::CampaignRole;

/// Mutation kinds the engine performs on locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationAction {
    Create,
    Update,
    Delete,
    Move,
}

impl LocationAction {
    /// Past-tense key used when reporting results for this action.
    pub fn past_tense(&self) -> &'static str {
        match self {
            LocationAction::Create => "created",
            LocationAction::Update => "updated",
            LocationAction::Delete => "deleted",
            LocationAction::Move => "moved",
        }
    }
}

impl std::fmt::Display for LocationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationAction::Create => write!(f, "create"),
            LocationAction::Update => write!(f, "update"),
            LocationAction::Delete => write!(f, "delete"),
            LocationAction::Move => write!(f, "move"),
        }
    }
}

/// How the acting user relates to the location being acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeRelationship {
    /// The actor created the location
    pub created_by_actor: bool,
    /// The location is owned by a character the actor controls
    pub owned_via_character: bool,
}

impl NodeRelationship {
    /// No relationship (also used for locations that do not exist yet).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_owner(&self) -> bool {
        self.created_by_actor || self.owned_via_character
    }
}

/// Decides whether a role may perform an action on a location.
pub trait PermissionPolicy: Send + Sync {
    fn allows(
        &self,
        role: CampaignRole,
        action: LocationAction,
        relationship: NodeRelationship,
    ) -> bool;
}

impl<F> PermissionPolicy for F
where
    F: Fn(CampaignRole, LocationAction, NodeRelationship) -> bool + Send + Sync,
{
    fn allows(
        &self,
        role: CampaignRole,
        action: LocationAction,
        relationship: NodeRelationship,
    ) -> bool {
        self(role, action, relationship)
    }
}

/// Standard campaign rules.
///
/// | Role     | create | update / delete / move         |
/// |----------|--------|--------------------------------|
/// | Owner    | yes    | yes                            |
/// | GM       | yes    | yes                            |
/// | Player   | yes    | only places they own or created |
/// | Observer | no     | no                             |
/// | None     | no     | no                             |
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPermissionPolicy;

impl PermissionPolicy for DefaultPermissionPolicy {
    fn allows(
        &self,
        role: CampaignRole,
        action: LocationAction,
        relationship: NodeRelationship,
    ) -> bool {
        if role.is_game_master() {
            return true;
        }
        match role {
            CampaignRole::Player => match action {
                LocationAction::Create => true,
                LocationAction::Update | LocationAction::Delete | LocationAction::Move => {
                    relationship.is_owner()
                }
            },
            _ => false,
        }
    }
}
