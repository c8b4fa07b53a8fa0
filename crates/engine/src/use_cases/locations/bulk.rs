//! Batched location writes with per-item partial success.
//!
//! Items run in input order, each as its own atomic write. A failing item is
//! recorded against its index and the batch carries on; only a corrupt
//! hierarchy stops the remaining items.

use std::collections::HashMap;
use std::sync::Arc;

use atlas_domain::{
    CampaignId, CampaignRole, LocationAction, LocationId, NodeRelationship, UserId,
};

use super::access::LocationAccess;
use super::error::LocationError;
use super::mutation::LocationMutations;
use super::navigation::LocationNavigation;
use super::types::{
    BulkFailure, BulkLocationRequest, BulkLocationResponse, BulkSuccess, BulkUpdateItem,
    CreateLocationInput,
};

pub struct BulkLocations {
    mutations: Arc<LocationMutations>,
    navigation: Arc<LocationNavigation>,
    access: Arc<LocationAccess>,
    max_batch_items: Option<usize>,
}

/// Roles resolved so far in one request, keyed by campaign.
#[derive(Default)]
struct RoleCache {
    roles: HashMap<CampaignId, CampaignRole>,
}

impl BulkLocations {
    pub fn new(
        mutations: Arc<LocationMutations>,
        navigation: Arc<LocationNavigation>,
        access: Arc<LocationAccess>,
        max_batch_items: Option<usize>,
    ) -> Self {
        Self {
            mutations,
            navigation,
            access,
            max_batch_items,
        }
    }

    /// Apply every item in `request`.
    ///
    /// # Errors
    /// * `InvalidRequest` - the batch is empty or above the configured cap;
    ///   nothing was applied
    /// * `CorruptHierarchy` - stored data is inconsistent; items before the
    ///   failing one stay committed, later items are not attempted
    pub async fn execute(
        &self,
        actor: UserId,
        request: BulkLocationRequest,
    ) -> Result<BulkLocationResponse, LocationError> {
        if request.is_empty() {
            return Err(LocationError::InvalidRequest(
                "bulk request contains no items".to_string(),
            ));
        }
        if let Some(max) = self.max_batch_items {
            if request.len() > max {
                return Err(LocationError::InvalidRequest(format!(
                    "bulk request has {} items, the limit is {}",
                    request.len(),
                    max
                )));
            }
        }

        let action = request.action();
        let mut response = BulkLocationResponse::new(action, request.len());
        let mut roles = RoleCache::default();

        match request {
            BulkLocationRequest::Create { items } => {
                for (index, item) in items.into_iter().enumerate() {
                    let outcome = self.create_item(actor, &mut roles, item).await;
                    record(&mut response, index, outcome)?;
                }
            }
            BulkLocationRequest::Update { items } => {
                for (index, item) in items.into_iter().enumerate() {
                    let outcome = self.update_item(actor, &mut roles, item).await;
                    record(&mut response, index, outcome)?;
                }
            }
            BulkLocationRequest::Delete { location_ids } => {
                for (index, id) in location_ids.into_iter().enumerate() {
                    let outcome = self.delete_item(actor, &mut roles, id).await;
                    record(&mut response, index, outcome)?;
                }
            }
            BulkLocationRequest::Move {
                location_ids,
                new_parent,
            } => {
                for (index, id) in location_ids.into_iter().enumerate() {
                    let outcome = self.move_item(actor, &mut roles, id, new_parent).await;
                    record(&mut response, index, outcome)?;
                }
            }
        }

        let summary = response.summary();
        tracing::info!(
            action = %action,
            total = summary.total_requested,
            successful = summary.successful,
            failed = summary.failed,
            "Bulk location request complete"
        );
        Ok(response)
    }

    async fn create_item(
        &self,
        actor: UserId,
        roles: &mut RoleCache,
        item: CreateLocationInput,
    ) -> Result<BulkSuccess, LocationError> {
        let role = self.role(actor, roles, item.campaign_id).await?;
        self.access.authorize(
            role,
            LocationAction::Create,
            NodeRelationship::none(),
            None,
        )?;
        let location = self.mutations.create(actor, item).await?;
        Ok(BulkSuccess::Location(location))
    }

    async fn update_item(
        &self,
        actor: UserId,
        roles: &mut RoleCache,
        item: BulkUpdateItem,
    ) -> Result<BulkSuccess, LocationError> {
        self.check_existing(actor, roles, LocationAction::Update, item.location_id)
            .await?;
        let location = self
            .mutations
            .update(actor, item.location_id, item.changes)
            .await?;
        Ok(BulkSuccess::Location(location))
    }

    async fn delete_item(
        &self,
        actor: UserId,
        roles: &mut RoleCache,
        id: LocationId,
    ) -> Result<BulkSuccess, LocationError> {
        self.check_existing(actor, roles, LocationAction::Delete, id)
            .await?;
        let deleted = self.mutations.delete(actor, id).await?;
        Ok(BulkSuccess::Deleted(deleted))
    }

    async fn move_item(
        &self,
        actor: UserId,
        roles: &mut RoleCache,
        id: LocationId,
        new_parent: Option<LocationId>,
    ) -> Result<BulkSuccess, LocationError> {
        self.check_existing(actor, roles, LocationAction::Move, id)
            .await?;
        let location = self
            .mutations
            .move_location(actor, id, new_parent)
            .await?;
        Ok(BulkSuccess::Location(location))
    }

    /// Ownership predicates need the stored row, so they are checked per item.
    async fn check_existing(
        &self,
        actor: UserId,
        roles: &mut RoleCache,
        action: LocationAction,
        id: LocationId,
    ) -> Result<(), LocationError> {
        let location = self.navigation.get(id).await?;
        let role = self.role(actor, roles, location.campaign_id()).await?;
        self.access
            .check_location(actor, role, action, &location)
            .await
    }

    async fn role(
        &self,
        actor: UserId,
        roles: &mut RoleCache,
        campaign_id: CampaignId,
    ) -> Result<CampaignRole, LocationError> {
        if let Some(role) = roles.roles.get(&campaign_id) {
            return Ok(*role);
        }
        let role = self.access.role(actor, campaign_id).await?;
        roles.roles.insert(campaign_id, role);
        Ok(role)
    }
}

/// Record one item's outcome. Returns `Err` only when the batch must stop.
fn record(
    response: &mut BulkLocationResponse,
    index: usize,
    outcome: Result<BulkSuccess, LocationError>,
) -> Result<(), LocationError> {
    match outcome {
        Ok(success) => response.succeeded.push(success),
        Err(e) if e.is_fatal() => {
            tracing::error!(
                action = %response.action,
                item_index = index,
                completed = response.succeeded.len(),
                error = %e,
                "Aborting bulk request on corrupt hierarchy"
            );
            return Err(e);
        }
        Err(e) => {
            tracing::warn!(
                action = %response.action,
                item_index = index,
                code = e.code(),
                error = %e,
                "Bulk item failed"
            );
            response.failed.push(BulkFailure {
                item_index: index,
                error: e.to_string(),
                code: e.code(),
            });
        }
    }
    Ok(())
}
