//! Helper types for port operations.

use atlas_domain::{CampaignId, CharacterId, Location, LocationId, UserId};

// =============================================================================
// Location Listing
// =============================================================================

/// Which part of the tree a listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentScope {
    /// Every location in the campaign
    #[default]
    Any,
    /// Locations without a parent
    RootsOnly,
    /// Direct children of one location
    ChildrenOf(LocationId),
}

/// Filter for `LocationRepo::list_in_campaign`.
///
/// Results are ordered by name (then id). `limit`/`offset` page through
/// that ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    pub parent: ParentScope,
    /// Case-insensitive substring match on the name
    pub name_contains: Option<String>,
    pub owned_by: Option<CharacterId>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl LocationFilter {
    /// Everything in the campaign, unpaged.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn roots() -> Self {
        Self {
            parent: ParentScope::RootsOnly,
            ..Self::default()
        }
    }

    pub fn children_of(parent_id: LocationId) -> Self {
        Self {
            parent: ParentScope::ChildrenOf(parent_id),
            ..Self::default()
        }
    }

    pub fn with_name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    pub fn with_owner(mut self, owner: CharacterId) -> Self {
        self.owned_by = Some(owner);
        self
    }

    pub fn paged(mut self, limit: Option<u32>, offset: Option<u32>) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Whether a location passes the non-paging parts of the filter.
    pub fn matches(&self, location: &Location) -> bool {
        let parent_ok = match self.parent {
            ParentScope::Any => true,
            ParentScope::RootsOnly => location.is_root(),
            ParentScope::ChildrenOf(parent_id) => location.parent_id() == Some(parent_id),
        };
        let name_ok = self.name_contains.as_ref().map_or(true, |needle| {
            location
                .name()
                .as_str()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let owner_ok = self
            .owned_by
            .map_or(true, |owner| location.owned_by() == Some(owner));

        parent_ok && name_ok && owner_ok
    }
}

// =============================================================================
// Character References
// =============================================================================

/// What the engine needs to know about a character (NPC or PC).
///
/// The concrete kind does not matter for locations, only which campaign the
/// character lives in and which user, if any, controls it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRef {
    pub id: CharacterId,
    pub campaign_id: CampaignId,
    pub controlled_by: Option<UserId>,
}

impl CharacterRef {
    pub fn new(id: CharacterId, campaign_id: CampaignId) -> Self {
        Self {
            id,
            campaign_id,
            controlled_by: None,
        }
    }

    pub fn controlled_by(mut self, user_id: UserId) -> Self {
        self.controlled_by = Some(user_id);
        self
    }

    /// Same-collection check for owner references.
    pub fn belongs_to(&self, campaign_id: CampaignId) -> bool {
        !atlas_domain::violates_owner_campaign(self.campaign_id, campaign_id)
    }

    pub fn is_controlled_by(&self, user_id: UserId) -> bool {
        self.controlled_by == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_domain::LocationName;
    use chrono::Utc;

    fn location(name: &str, parent: Option<LocationId>) -> Location {
        Location::new(
            CampaignId::new(),
            LocationName::new(name).unwrap(),
            UserId::new(),
            Utc::now(),
        )
        .with_parent(parent)
    }

    #[test]
    fn filter_scopes_by_parent() {
        let parent = LocationId::new();
        let root = location("Harbor", None);
        let child = location("Pier", Some(parent));

        assert!(LocationFilter::all().matches(&root));
        assert!(LocationFilter::roots().matches(&root));
        assert!(!LocationFilter::roots().matches(&child));
        assert!(LocationFilter::children_of(parent).matches(&child));
        assert!(!LocationFilter::children_of(parent).matches(&root));
    }

    #[test]
    fn name_filter_ignores_case() {
        let tavern = location("The Gilded Tankard", None);
        assert!(LocationFilter::all()
            .with_name_contains("gilded")
            .matches(&tavern));
        assert!(!LocationFilter::all()
            .with_name_contains("silver")
            .matches(&tavern));
    }

    #[test]
    fn owner_filter_requires_exact_owner() {
        let owner = CharacterId::new();
        let owned = location("Keep", None).with_owner(Some(owner));
        let unowned = location("Ruins", None);

        let filter = LocationFilter::all().with_owner(owner);
        assert!(filter.matches(&owned));
        assert!(!filter.matches(&unowned));
    }

    #[test]
    fn character_ref_checks() {
        let campaign = CampaignId::new();
        let user = UserId::new();
        let character = CharacterRef::new(CharacterId::new(), campaign).controlled_by(user);

        assert!(character.belongs_to(campaign));
        assert!(!character.belongs_to(CampaignId::new()));
        assert!(character.is_controlled_by(user));
        assert!(!character.is_controlled_by(UserId::new()));
    }
}
