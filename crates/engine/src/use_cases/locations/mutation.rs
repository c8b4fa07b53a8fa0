//! Single-location writes: create, update, move, delete.
//!
//! Each write holds its campaign's lock while it snapshots the campaign,
//! validates, and commits, then emits exactly one `LocationMutated` event.
//! Callers are expected to have checked permissions already.

use std::sync::Arc;

use atlas_domain::{Location, LocationAction, LocationId, LocationMutated, UserId};

use super::error::{LocationError, ValidationField, ValidationReason};
use super::navigation::LocationNavigation;
use super::types::{CreateLocationInput, DeletedLocation, UpdateLocationInput};
use super::validator::{parse_description, parse_name, LocationValidator, Placement};
use crate::infrastructure::locks::CampaignLocks;
use crate::infrastructure::ports::{
    CampaignDirectory, ClockPort, LocationEventSink, LocationRepo, RepoError,
};

/// Attempts made after the store reports a constraint violation.
const CONSTRAINT_RETRIES: usize = 1;

#[derive(Clone, Copy)]
enum Write<'a> {
    Insert(&'a Location),
    Replace(&'a Location),
}

pub struct LocationMutations {
    locations: Arc<dyn LocationRepo>,
    campaigns: Arc<dyn CampaignDirectory>,
    events: Arc<dyn LocationEventSink>,
    clock: Arc<dyn ClockPort>,
    locks: Arc<CampaignLocks>,
    navigation: Arc<LocationNavigation>,
    validator: LocationValidator,
}

impl LocationMutations {
    pub fn new(
        locations: Arc<dyn LocationRepo>,
        campaigns: Arc<dyn CampaignDirectory>,
        events: Arc<dyn LocationEventSink>,
        clock: Arc<dyn ClockPort>,
        locks: Arc<CampaignLocks>,
        navigation: Arc<LocationNavigation>,
        validator: LocationValidator,
    ) -> Self {
        Self {
            locations,
            campaigns,
            events,
            clock,
            locks,
            navigation,
            validator,
        }
    }

    /// Create a location.
    ///
    /// # Errors
    /// * `Validation` - bad name/description, foreign parent or owner, cycle,
    ///   depth, or duplicate name
    /// * `NotFound` - campaign, parent, or owner does not exist
    pub async fn create(
        &self,
        actor: UserId,
        input: CreateLocationInput,
    ) -> Result<Location, LocationError> {
        let name = parse_name(&input.name)?;
        let description = parse_description(input.description)?;

        if !self.campaigns.campaign_exists(input.campaign_id).await? {
            return Err(LocationError::not_found("Campaign", input.campaign_id));
        }

        let location = Location::new(input.campaign_id, name.clone(), actor, self.clock.now())
            .with_description(description)
            .with_parent(input.parent_id)
            .with_owner(input.owned_by);
        let placement = Placement::new_node(name, input.parent_id, input.owned_by);

        let _guard = self.locks.acquire(location.campaign_id()).await;
        self.validate_and_write(&placement, Write::Insert(&location))
            .await?;

        tracing::info!(
            location_id = %location.id(),
            campaign_id = %location.campaign_id(),
            parent_id = ?location.parent_id(),
            "Created location"
        );
        self.notify(&location, LocationAction::Create, actor, Vec::new());
        Ok(location)
    }

    /// Apply a partial update. Only fields that actually change are validated.
    pub async fn update(
        &self,
        actor: UserId,
        id: LocationId,
        input: UpdateLocationInput,
    ) -> Result<Location, LocationError> {
        self.apply(actor, id, input, LocationAction::Update).await
    }

    /// Change only the parent; `None` makes the location a root.
    pub async fn move_location(
        &self,
        actor: UserId,
        id: LocationId,
        new_parent: Option<LocationId>,
    ) -> Result<Location, LocationError> {
        self.apply(
            actor,
            id,
            UpdateLocationInput::reparent(new_parent),
            LocationAction::Move,
        )
        .await
    }

    /// Remove a location and promote its children to its parent.
    ///
    /// Never fails because of the tree's shape; only a missing location or a
    /// storage failure is an error.
    pub async fn delete(
        &self,
        actor: UserId,
        id: LocationId,
    ) -> Result<DeletedLocation, LocationError> {
        let location = self.navigation.get(id).await?;

        let _guard = self.locks.acquire(location.campaign_id()).await;
        let promoted_children = self.locations.delete(id, self.clock.now()).await?;

        tracing::info!(
            location_id = %id,
            campaign_id = %location.campaign_id(),
            promoted = promoted_children.len(),
            "Deleted location"
        );
        self.notify(
            &location,
            LocationAction::Delete,
            actor,
            promoted_children.clone(),
        );

        Ok(DeletedLocation {
            id,
            campaign_id: location.campaign_id(),
            promoted_children,
        })
    }

    async fn apply(
        &self,
        actor: UserId,
        id: LocationId,
        input: UpdateLocationInput,
        action: LocationAction,
    ) -> Result<Location, LocationError> {
        let name = input.name.as_deref().map(parse_name).transpose()?;
        let description = input.description.map(parse_description).transpose()?;

        let current = self.navigation.get(id).await?;
        if let Some(campaign_id) = input.campaign_id {
            if campaign_id != current.campaign_id() {
                return Err(LocationError::validation(
                    ValidationField::Campaign,
                    ValidationReason::Immutable,
                ));
            }
        }

        let _guard = self.locks.acquire(current.campaign_id()).await;
        // Re-read under the lock so the diff is against committed state.
        let mut location = self.navigation.get(id).await?;
        let mut placement = Placement::existing(id);
        let mut changed = false;

        if let Some(name) = name {
            if &name != location.name() {
                location.set_name(name.clone());
                placement.name = Some(name);
            }
        }
        if let Some(description) = description {
            if &description != location.description() {
                location.set_description(description);
                changed = true;
            }
        }
        if let Some(parent) = input.parent_id {
            if parent != location.parent_id() {
                location.set_parent(parent);
                placement.parent = Some(parent);
            }
        }
        if let Some(owner) = input.owned_by {
            if owner != location.owned_by() {
                location.set_owner(owner);
                placement.owner = Some(owner);
            }
        }

        if placement.is_noop() && !changed {
            tracing::debug!(location_id = %id, "Update changes nothing, skipping write");
            return Ok(location);
        }

        location.touch(self.clock.now());
        self.validate_and_write(&placement, Write::Replace(&location))
            .await?;

        tracing::info!(
            location_id = %id,
            campaign_id = %location.campaign_id(),
            action = %action,
            "Updated location"
        );
        self.notify(&location, action, actor, Vec::new());
        Ok(location)
    }

    /// Validate against a fresh snapshot and commit. A constraint violation
    /// from the store means another writer got in first; validate once more
    /// and retry before giving up with a duplicate-name error.
    async fn validate_and_write(
        &self,
        placement: &Placement,
        write: Write<'_>,
    ) -> Result<(), LocationError> {
        let location = match write {
            Write::Insert(l) | Write::Replace(l) => l,
        };

        for attempt in 0..=CONSTRAINT_RETRIES {
            let tree = self.navigation.snapshot(location.campaign_id()).await?;
            self.validator.validate(&tree, placement).await?;

            let result = match write {
                Write::Insert(l) => self.locations.create(l).await,
                Write::Replace(l) => self.locations.update(l).await,
            };
            match result {
                Ok(()) => return Ok(()),
                Err(RepoError::ConstraintViolation(detail)) => {
                    tracing::warn!(
                        location_id = %location.id(),
                        attempt,
                        detail = %detail,
                        "Store rejected location write"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LocationError::validation(
            ValidationField::Name,
            ValidationReason::Duplicate,
        ))
    }

    fn notify(
        &self,
        location: &Location,
        action: LocationAction,
        actor: UserId,
        promoted_children: Vec<LocationId>,
    ) {
        let event = LocationMutated::new(
            location.id(),
            location.campaign_id(),
            action,
            actor,
            self.clock.now(),
        )
        .with_promoted_children(promoted_children);
        self.events.location_mutated(event);
    }
}
