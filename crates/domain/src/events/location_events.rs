use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::LocationAction;
use crate::{CampaignId, LocationId, UserId};

/// A single committed location mutation.
///
/// Deleting a location emits one event for the deleted node; the children it
/// promoted are listed in `promoted_children` rather than emitted separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMutated {
    pub location_id: LocationId,
    pub campaign_id: CampaignId,
    pub action: LocationAction,
    pub actor: UserId,
    pub occurred_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub promoted_children: Vec<LocationId>,
}

impl LocationMutated {
    pub fn new(
        location_id: LocationId,
        campaign_id: CampaignId,
        action: LocationAction,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            location_id,
            campaign_id,
            action,
            actor,
            occurred_at,
            promoted_children: Vec::new(),
        }
    }

    pub fn with_promoted_children(mut self, children: Vec<LocationId>) -> Self {
        self.promoted_children = children;
        self
    }
}
