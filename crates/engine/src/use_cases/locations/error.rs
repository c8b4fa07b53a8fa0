//! Location operation errors.

use std::fmt;

use atlas_domain::{HierarchyError, LocationAction, LocationId, TextError};
use serde::Serialize;

use crate::infrastructure::ports::RepoError;

/// Input field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationField {
    Name,
    Description,
    Parent,
    OwnedBy,
    Campaign,
}

impl fmt::Display for ValidationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationField::Name => "name",
            ValidationField::Description => "description",
            ValidationField::Parent => "parent",
            ValidationField::OwnedBy => "owned_by",
            ValidationField::Campaign => "campaign",
        };
        f.write_str(s)
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    Empty,
    TooLong,
    Duplicate,
    Cycle,
    MaxDepthExceeded,
    CrossCampaign,
    Immutable,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationReason::Empty => "must not be empty",
            ValidationReason::TooLong => "is too long",
            ValidationReason::Duplicate => "is already used in this campaign",
            ValidationReason::Cycle => "would make the location its own ancestor",
            ValidationReason::MaxDepthExceeded => "would exceed the maximum depth",
            ValidationReason::CrossCampaign => "belongs to a different campaign",
            ValidationReason::Immutable => "cannot be changed",
        };
        f.write_str(s)
    }
}

impl From<TextError> for ValidationReason {
    fn from(err: TextError) -> Self {
        match err {
            TextError::Empty { .. } => ValidationReason::Empty,
            TextError::TooLong { .. } => ValidationReason::TooLong,
        }
    }
}

/// Errors surfaced by location navigation, mutation, and bulk operations.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    /// Caller input violates an invariant; fixable by changing the request
    #[error("Invalid {field}: {reason}")]
    Validation {
        field: ValidationField,
        reason: ValidationReason,
    },

    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    #[error("Not allowed to {action} {}", describe_target(.location_id))]
    PermissionDenied {
        action: LocationAction,
        location_id: Option<LocationId>,
    },

    /// Stored data already violates the tree invariants
    #[error("Corrupt hierarchy at location {location_id}: {detail}")]
    CorruptHierarchy {
        location_id: LocationId,
        detail: String,
    },

    /// Rejected before any item was processed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Repository error: {0}")]
    Repo(RepoError),
}

fn describe_target(location_id: &Option<LocationId>) -> String {
    match location_id {
        Some(id) => format!("location {}", id),
        None => "locations in this campaign".to_string(),
    }
}

impl LocationError {
    pub fn validation(field: ValidationField, reason: ValidationReason) -> Self {
        Self::Validation { field, reason }
    }

    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn permission_denied(action: LocationAction, location_id: Option<LocationId>) -> Self {
        Self::PermissionDenied {
            action,
            location_id,
        }
    }

    /// Map a text newtype failure onto a field.
    pub fn text(field: ValidationField, err: TextError) -> Self {
        Self::validation(field, err.into())
    }

    /// True when the tree can no longer be trusted and batch work must stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CorruptHierarchy { .. })
    }

    /// Stable machine-readable error class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::CorruptHierarchy { .. } => "corrupt_hierarchy",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Repo(_) => "storage",
        }
    }
}

impl From<RepoError> for LocationError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::Repo(other),
        }
    }
}

impl From<HierarchyError> for LocationError {
    fn from(err: HierarchyError) -> Self {
        if err.is_corrupt() {
            Self::CorruptHierarchy {
                location_id: err.location_id(),
                detail: err.to_string(),
            }
        } else {
            Self::not_found("Location", err.location_id())
        }
    }
}
