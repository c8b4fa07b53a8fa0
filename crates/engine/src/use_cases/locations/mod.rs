//! Location hierarchy use cases.
//!
//! - `navigation` - read-only tree queries over campaign snapshots
//! - `validator` - invariant checks shared by every write path
//! - `mutation` - single-location create/update/move/delete
//! - `access` - role and ownership checks
//! - `bulk` - batched writes with per-item partial success

use std::sync::Arc;

pub mod access;
pub mod bulk;
pub mod error;
pub mod mutation;
pub mod navigation;
pub mod types;
pub mod validator;

pub use access::LocationAccess;
pub use bulk::BulkLocations;
pub use error::{LocationError, ValidationField, ValidationReason};
pub use mutation::LocationMutations;
pub use navigation::LocationNavigation;
pub use types::{
    BulkFailure, BulkLocationRequest, BulkLocationResponse, BulkSuccess, BulkSummary,
    BulkUpdateItem, CreateLocationInput, DeletedLocation, UpdateLocationInput,
};
pub use validator::{LocationValidator, Placement};

/// Container for location use cases.
pub struct LocationUseCases {
    pub navigation: Arc<LocationNavigation>,
    pub mutations: Arc<LocationMutations>,
    pub access: Arc<LocationAccess>,
    pub bulk: Arc<BulkLocations>,
}

impl LocationUseCases {
    pub fn new(
        navigation: Arc<LocationNavigation>,
        mutations: Arc<LocationMutations>,
        access: Arc<LocationAccess>,
        bulk: Arc<BulkLocations>,
    ) -> Self {
        Self {
            navigation,
            mutations,
            access,
            bulk,
        }
    }
}
