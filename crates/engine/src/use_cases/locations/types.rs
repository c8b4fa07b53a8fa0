//! Request and result types for location operations.

use atlas_domain::{CampaignId, CharacterId, Location, LocationAction, LocationId};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::LocationError;

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Single-item inputs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateLocationInput {
    pub campaign_id: CampaignId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<LocationId>,
    #[serde(default)]
    pub owned_by: Option<CharacterId>,
}

impl CreateLocationInput {
    pub fn new(campaign_id: CampaignId, name: impl Into<String>) -> Self {
        Self {
            campaign_id,
            name: name.into(),
            description: None,
            parent_id: None,
            owned_by: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parent(mut self, parent_id: LocationId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_owner(mut self, owned_by: CharacterId) -> Self {
        self.owned_by = Some(owned_by);
        self
    }
}

/// Partial update. Absent fields are left alone; an explicit `null` clears
/// the description, the parent (making a root), or the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateLocationInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<LocationId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub owned_by: Option<Option<CharacterId>>,
    /// Present only so attempts to change it can be rejected
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
}

impl UpdateLocationInput {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn reparent(parent_id: Option<LocationId>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_owner(mut self, owned_by: Option<CharacterId>) -> Self {
        self.owned_by = Some(owned_by);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.parent_id.is_none()
            && self.owned_by.is_none()
            && self.campaign_id.is_none()
    }
}

/// Result of a delete: the removed node and the children moved up a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedLocation {
    pub id: LocationId,
    pub campaign_id: CampaignId,
    pub promoted_children: Vec<LocationId>,
}

// =============================================================================
// Bulk request
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BulkUpdateItem {
    pub location_id: LocationId,
    pub changes: UpdateLocationInput,
}

/// One bulk request; the `action` tag selects the payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BulkLocationRequest {
    Create {
        items: Vec<CreateLocationInput>,
    },
    Update {
        items: Vec<BulkUpdateItem>,
    },
    Delete {
        location_ids: Vec<LocationId>,
    },
    Move {
        location_ids: Vec<LocationId>,
        #[serde(default)]
        new_parent: Option<LocationId>,
    },
}

impl BulkLocationRequest {
    /// Parse a request body; an unknown action or bad payload is rejected
    /// before any item runs.
    pub fn from_json(value: serde_json::Value) -> Result<Self, LocationError> {
        serde_json::from_value(value).map_err(|e| LocationError::InvalidRequest(e.to_string()))
    }

    pub fn action(&self) -> LocationAction {
        match self {
            Self::Create { .. } => LocationAction::Create,
            Self::Update { .. } => LocationAction::Update,
            Self::Delete { .. } => LocationAction::Delete,
            Self::Move { .. } => LocationAction::Move,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Create { items } => items.len(),
            Self::Update { items } => items.len(),
            Self::Delete { location_ids } | Self::Move { location_ids, .. } => location_ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Bulk response
// =============================================================================

/// A successfully applied item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BulkSuccess {
    Location(Location),
    Deleted(DeletedLocation),
}

impl BulkSuccess {
    pub fn id(&self) -> LocationId {
        match self {
            Self::Location(location) => location.id(),
            Self::Deleted(deleted) => deleted.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    /// Position of the item in the request
    pub item_index: usize,
    pub error: String,
    /// Machine-readable class, see `LocationError::code`
    pub code: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub total_requested: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Per-item outcome report for one bulk request.
///
/// Serialises as `{ "<created|updated|deleted|moved>": [...], "failed": [...],
/// "summary": {...} }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkLocationResponse {
    pub action: LocationAction,
    pub succeeded: Vec<BulkSuccess>,
    pub failed: Vec<BulkFailure>,
    pub total_requested: usize,
}

impl BulkLocationResponse {
    pub fn new(action: LocationAction, total_requested: usize) -> Self {
        Self {
            action,
            succeeded: Vec::with_capacity(total_requested),
            failed: Vec::new(),
            total_requested,
        }
    }

    pub fn summary(&self) -> BulkSummary {
        BulkSummary {
            total_requested: self.total_requested,
            successful: self.succeeded.len(),
            failed: self.failed.len(),
        }
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.failed.iter().map(|f| f.item_index).collect()
    }
}

impl Serialize for BulkLocationResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(self.action.past_tense(), &self.succeeded)?;
        map.serialize_entry("failed", &self.failed)?;
        map.serialize_entry("summary", &self.summary())?;
        map.end()
    }
}
