//! Repository port traits for database access.

use async_trait::async_trait;
use atlas_domain::{CampaignId, Location, LocationId, LocationName};
use chrono::{DateTime, Utc};

use super::error::RepoError;
use super::types::LocationFilter;

// =============================================================================
// Location Storage
// =============================================================================

/// Durable store for location rows.
///
/// Implementations enforce `(campaign_id, name)` uniqueness and same-campaign
/// parent references themselves, failing with `RepoError::ConstraintViolation`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepo: Send + Sync {
    async fn get(&self, id: LocationId) -> Result<Option<Location>, RepoError>;

    /// Insert a new row.
    async fn create(&self, location: &Location) -> Result<(), RepoError>;

    /// Replace an existing row. Fails with `NotFound` if it does not exist.
    async fn update(&self, location: &Location) -> Result<(), RepoError>;

    /// Remove a location and reparent its direct children to its own parent,
    /// as one atomic unit. Returns the promoted child ids.
    async fn delete(
        &self,
        id: LocationId,
        now: DateTime<Utc>,
    ) -> Result<Vec<LocationId>, RepoError>;

    async fn list_in_campaign(
        &self,
        campaign_id: CampaignId,
        filter: &LocationFilter,
    ) -> Result<Vec<Location>, RepoError>;

    async fn find_by_name(
        &self,
        campaign_id: CampaignId,
        name: &LocationName,
    ) -> Result<Option<Location>, RepoError>;
}
