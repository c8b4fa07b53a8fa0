//! In-memory adapters for embedding and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use atlas_domain::{
    CampaignId, CampaignRole, CharacterId, Location, LocationId, LocationName, UserId,
};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{
    CampaignDirectory, CharacterDirectory, CharacterRef, LocationFilter, LocationRepo, RepoError,
};

// =============================================================================
// Location store
// =============================================================================

/// Location store backed by a `HashMap`.
///
/// Enforces the same constraints as the SQLite store: unique names per
/// campaign and parents that exist in the same campaign.
#[derive(Default)]
pub struct InMemoryLocationRepo {
    locations: RwLock<HashMap<LocationId, Location>>,
}

impl InMemoryLocationRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a row without any constraint checks.
    #[cfg(test)]
    pub async fn insert_unchecked(&self, location: Location) {
        self.locations.write().await.insert(location.id(), location);
    }

    pub async fn len(&self) -> usize {
        self.locations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locations.read().await.is_empty()
    }
}

fn check_constraints(
    locations: &HashMap<LocationId, Location>,
    location: &Location,
) -> Result<(), RepoError> {
    let duplicate = locations.values().any(|other| {
        other.id() != location.id()
            && other.campaign_id() == location.campaign_id()
            && other.name() == location.name()
    });
    if duplicate {
        return Err(RepoError::constraint(format!(
            "location name '{}' already exists in campaign {}",
            location.name(),
            location.campaign_id()
        )));
    }

    if let Some(parent_id) = location.parent_id() {
        match locations.get(&parent_id) {
            Some(parent) if parent.campaign_id() == location.campaign_id() => {}
            _ => {
                return Err(RepoError::constraint(format!(
                    "parent {} is not a location in campaign {}",
                    parent_id,
                    location.campaign_id()
                )))
            }
        }
    }

    Ok(())
}

#[async_trait]
impl LocationRepo for InMemoryLocationRepo {
    async fn get(&self, id: LocationId) -> Result<Option<Location>, RepoError> {
        Ok(self.locations.read().await.get(&id).cloned())
    }

    async fn create(&self, location: &Location) -> Result<(), RepoError> {
        let mut locations = self.locations.write().await;
        if locations.contains_key(&location.id()) {
            return Err(RepoError::constraint(format!(
                "location {} already exists",
                location.id()
            )));
        }
        check_constraints(&locations, location)?;
        locations.insert(location.id(), location.clone());
        Ok(())
    }

    async fn update(&self, location: &Location) -> Result<(), RepoError> {
        let mut locations = self.locations.write().await;
        let existing = locations
            .get(&location.id())
            .ok_or_else(|| RepoError::not_found("Location", location.id()))?;
        if existing.campaign_id() != location.campaign_id() {
            return Err(RepoError::constraint(format!(
                "location {} cannot change campaign",
                location.id()
            )));
        }
        check_constraints(&locations, location)?;
        locations.insert(location.id(), location.clone());
        Ok(())
    }

    async fn delete(
        &self,
        id: LocationId,
        now: DateTime<Utc>,
    ) -> Result<Vec<LocationId>, RepoError> {
        // One write guard covers the reparenting and the removal.
        let mut locations = self.locations.write().await;
        let removed = locations
            .remove(&id)
            .ok_or_else(|| RepoError::not_found("Location", id))?;

        let mut promoted: Vec<&mut Location> = locations
            .values_mut()
            .filter(|l| l.campaign_id() == removed.campaign_id() && l.parent_id() == Some(id))
            .collect();
        promoted.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));

        let mut promoted_ids = Vec::with_capacity(promoted.len());
        for child in promoted {
            child.set_parent(removed.parent_id());
            child.touch(now);
            promoted_ids.push(child.id());
        }
        Ok(promoted_ids)
    }

    async fn list_in_campaign(
        &self,
        campaign_id: CampaignId,
        filter: &LocationFilter,
    ) -> Result<Vec<Location>, RepoError> {
        let locations = self.locations.read().await;
        let mut matching: Vec<Location> = locations
            .values()
            .filter(|l| l.campaign_id() == campaign_id && filter.matches(l))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));

        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn find_by_name(
        &self,
        campaign_id: CampaignId,
        name: &LocationName,
    ) -> Result<Option<Location>, RepoError> {
        Ok(self
            .locations
            .read()
            .await
            .values()
            .find(|l| l.campaign_id() == campaign_id && l.name() == name)
            .cloned())
    }
}

// =============================================================================
// Campaign & character directory
// =============================================================================

/// Campaign membership and character registry held in memory.
#[derive(Default)]
pub struct InMemoryCampaignDirectory {
    campaigns: RwLock<HashMap<CampaignId, HashMap<UserId, CampaignRole>>>,
    characters: RwLock<HashMap<CharacterId, CharacterRef>>,
}

impl InMemoryCampaignDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_campaign(&self, campaign_id: CampaignId) {
        self.campaigns
            .write()
            .await
            .entry(campaign_id)
            .or_default();
    }

    /// Grant a role, registering the campaign if needed.
    pub async fn set_role(&self, campaign_id: CampaignId, user_id: UserId, role: CampaignRole) {
        self.campaigns
            .write()
            .await
            .entry(campaign_id)
            .or_default()
            .insert(user_id, role);
    }

    pub async fn add_character(&self, character: CharacterRef) {
        self.characters
            .write()
            .await
            .insert(character.id, character);
    }
}

#[async_trait]
impl CampaignDirectory for InMemoryCampaignDirectory {
    async fn campaign_exists(&self, campaign_id: CampaignId) -> Result<bool, RepoError> {
        Ok(self.campaigns.read().await.contains_key(&campaign_id))
    }

    async fn resolve_role(
        &self,
        user_id: UserId,
        campaign_id: CampaignId,
    ) -> Result<CampaignRole, RepoError> {
        Ok(self
            .campaigns
            .read()
            .await
            .get(&campaign_id)
            .and_then(|members| members.get(&user_id).copied())
            .unwrap_or_default())
    }
}

#[async_trait]
impl CharacterDirectory for InMemoryCampaignDirectory {
    async fn get_character(&self, id: CharacterId) -> Result<Option<CharacterRef>, RepoError> {
        Ok(self.characters.read().await.get(&id).cloned())
    }
}
