//! Read-only tree queries.
//!
//! Every id-based query loads the node, batch-fetches its campaign once, and
//! answers from the resulting [`CampaignTree`] snapshot instead of issuing one
//! store query per level.

use std::sync::Arc;

use atlas_domain::{
    CampaignId, CampaignTree, IntegrityIssue, Location, LocationId, LocationPath,
    LocationTreeNode, MaxDepth,
};

use super::error::LocationError;
use super::validator::parse_name;
use crate::infrastructure::ports::{LocationFilter, LocationRepo};

pub struct LocationNavigation {
    locations: Arc<dyn LocationRepo>,
    max_depth: MaxDepth,
}

impl LocationNavigation {
    pub fn new(locations: Arc<dyn LocationRepo>, max_depth: MaxDepth) -> Self {
        Self {
            locations,
            max_depth,
        }
    }

    pub fn max_depth(&self) -> MaxDepth {
        self.max_depth
    }

    /// Fetch one location or fail with `NotFound`.
    pub async fn get(&self, id: LocationId) -> Result<Location, LocationError> {
        self.locations
            .get(id)
            .await?
            .ok_or_else(|| LocationError::not_found("Location", id))
    }

    /// Batch-fetch a whole campaign into an adjacency snapshot.
    pub async fn snapshot(&self, campaign_id: CampaignId) -> Result<CampaignTree, LocationError> {
        let locations = self
            .locations
            .list_in_campaign(campaign_id, &LocationFilter::all())
            .await?;
        Ok(CampaignTree::from_locations(
            campaign_id,
            self.max_depth,
            locations,
        ))
    }

    async fn snapshot_for(&self, id: LocationId) -> Result<CampaignTree, LocationError> {
        let location = self.get(id).await?;
        self.snapshot(location.campaign_id()).await
    }

    /// Immediate parent first, root last; empty for a root.
    pub async fn ancestors(&self, id: LocationId) -> Result<Vec<Location>, LocationError> {
        let tree = self.snapshot_for(id).await?;
        let ids = tree.ancestors(id).map_err(|e| corrupt(e.into()))?;
        Ok(resolve(&tree, &ids))
    }

    /// Every node below `id`, breadth-first.
    pub async fn descendants(&self, id: LocationId) -> Result<Vec<Location>, LocationError> {
        let tree = self.snapshot_for(id).await?;
        let ids = tree.descendants(id).map_err(|e| corrupt(e.into()))?;
        Ok(resolve(&tree, &ids))
    }

    pub async fn depth(&self, id: LocationId) -> Result<usize, LocationError> {
        let tree = self.snapshot_for(id).await?;
        tree.depth(id).map_err(|e| corrupt(e.into()))
    }

    /// The topmost ancestor, or the node itself for a root.
    pub async fn root(&self, id: LocationId) -> Result<Location, LocationError> {
        let tree = self.snapshot_for(id).await?;
        let root_id = tree.root(id).map_err(|e| corrupt(e.into()))?;
        tree.get(root_id)
            .cloned()
            .ok_or_else(|| LocationError::not_found("Location", root_id))
    }

    /// Nodes sharing `id`'s parent (or the other roots), excluding `id`.
    pub async fn siblings(&self, id: LocationId) -> Result<Vec<Location>, LocationError> {
        let tree = self.snapshot_for(id).await?;
        let ids = tree.siblings(id)?;
        Ok(resolve(&tree, &ids))
    }

    /// Direct children, ordered by name. Served by the store's parent index.
    pub async fn children(&self, id: LocationId) -> Result<Vec<Location>, LocationError> {
        let location = self.get(id).await?;
        Ok(self
            .locations
            .list_in_campaign(location.campaign_id(), &LocationFilter::children_of(id))
            .await?)
    }

    pub async fn full_path(&self, id: LocationId) -> Result<LocationPath, LocationError> {
        let tree = self.snapshot_for(id).await?;
        tree.full_path(id).map_err(|e| corrupt(e.into()))
    }

    /// True when `ancestor` is somewhere above `id`. Locations in different
    /// campaigns are never related.
    pub async fn is_descendant_of(
        &self,
        id: LocationId,
        ancestor: LocationId,
    ) -> Result<bool, LocationError> {
        let location = self.get(id).await?;
        let other = self.get(ancestor).await?;
        if location.campaign_id() != other.campaign_id() {
            return Ok(false);
        }
        let tree = self.snapshot(location.campaign_id()).await?;
        tree.is_descendant_of(id, ancestor)
            .map_err(|e| corrupt(e.into()))
    }

    pub async fn list(
        &self,
        campaign_id: CampaignId,
        filter: &LocationFilter,
    ) -> Result<Vec<Location>, LocationError> {
        Ok(self.locations.list_in_campaign(campaign_id, filter).await?)
    }

    /// Exact-name lookup within one campaign.
    pub async fn find_by_name(
        &self,
        campaign_id: CampaignId,
        name: &str,
    ) -> Result<Location, LocationError> {
        let name = parse_name(name)?;
        self.locations
            .find_by_name(campaign_id, &name)
            .await?
            .ok_or_else(|| LocationError::not_found("Location", &name))
    }

    /// Nested view of the whole campaign, children ordered by name.
    pub async fn tree(&self, campaign_id: CampaignId) -> Result<Vec<LocationTreeNode>, LocationError> {
        Ok(self.snapshot(campaign_id).await?.forest())
    }

    /// Every integrity problem in the stored campaign.
    pub async fn audit(&self, campaign_id: CampaignId) -> Result<Vec<IntegrityIssue>, LocationError> {
        let issues = self.snapshot(campaign_id).await?.audit();
        if !issues.is_empty() {
            tracing::warn!(
                campaign_id = %campaign_id,
                issues = issues.len(),
                "Campaign hierarchy failed integrity audit"
            );
        }
        Ok(issues)
    }
}

fn resolve(tree: &CampaignTree, ids: &[LocationId]) -> Vec<Location> {
    ids.iter().filter_map(|id| tree.get(*id)).cloned().collect()
}

/// Log corruption loudly on the way out.
fn corrupt(err: LocationError) -> LocationError {
    if let LocationError::CorruptHierarchy {
        location_id,
        detail,
    } = &err
    {
        tracing::error!(location_id = %location_id, detail = %detail, "Corrupt location hierarchy");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryLocationRepo;
    use crate::infrastructure::ports::{MockLocationRepo, RepoError};
    use atlas_domain::{LocationName, UserId};
    use chrono::Utc;

    fn loc(campaign: CampaignId, name: &str, parent: Option<LocationId>) -> Location {
        Location::new(campaign, LocationName::new(name).unwrap(), UserId::new(), Utc::now())
            .with_parent(parent)
    }

    /// World -> Continent -> Kingdom -> City, plus a sibling Isles under World.
    async fn seeded() -> (LocationNavigation, Vec<Location>) {
        let campaign = CampaignId::new();
        let world = loc(campaign, "World", None);
        let continent = loc(campaign, "Continent", Some(world.id()));
        let kingdom = loc(campaign, "Kingdom", Some(continent.id()));
        let city = loc(campaign, "City", Some(kingdom.id()));
        let isles = loc(campaign, "Isles", Some(world.id()));

        let repo = InMemoryLocationRepo::new();
        let all = vec![world, continent, kingdom, city, isles];
        for l in &all {
            repo.create(l).await.unwrap();
        }
        (
            LocationNavigation::new(Arc::new(repo), MaxDepth::default()),
            all,
        )
    }

    fn names(locations: &[Location]) -> Vec<&str> {
        locations.iter().map(|l| l.name().as_str()).collect()
    }

    #[tokio::test]
    async fn ancestors_depth_and_root() {
        let (nav, all) = seeded().await;
        let city = all[3].id();

        assert_eq!(
            names(&nav.ancestors(city).await.unwrap()),
            ["Kingdom", "Continent", "World"]
        );
        assert_eq!(nav.depth(city).await.unwrap(), 3);
        assert_eq!(nav.root(city).await.unwrap().id(), all[0].id());
        assert!(nav.ancestors(all[0].id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn descendants_siblings_and_children() {
        let (nav, all) = seeded().await;
        let world = all[0].id();

        assert_eq!(nav.descendants(world).await.unwrap().len(), 4);
        assert!(nav.descendants(all[3].id()).await.unwrap().is_empty());
        assert_eq!(names(&nav.siblings(all[1].id()).await.unwrap()), ["Isles"]);
        assert_eq!(
            names(&nav.children(world).await.unwrap()),
            ["Continent", "Isles"]
        );
    }

    #[tokio::test]
    async fn find_by_name_matches_whole_trimmed_names() {
        let (nav, all) = seeded().await;
        let campaign = all[0].campaign_id();

        assert_eq!(
            nav.find_by_name(campaign, "  Kingdom ").await.unwrap().id(),
            all[2].id()
        );
        assert!(matches!(
            nav.find_by_name(campaign, "King").await,
            Err(LocationError::NotFound { entity_type: "Location", .. })
        ));
        assert!(matches!(
            nav.find_by_name(CampaignId::new(), "Kingdom").await,
            Err(LocationError::NotFound { .. })
        ));
        assert!(matches!(
            nav.find_by_name(campaign, "   ").await,
            Err(LocationError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn full_path_and_descendant_checks() {
        let (nav, all) = seeded().await;
        let city = all[3].id();

        assert_eq!(
            nav.full_path(city).await.unwrap().to_string(),
            "World > Continent > Kingdom > City"
        );
        assert!(nav.is_descendant_of(city, all[0].id()).await.unwrap());
        assert!(!nav.is_descendant_of(city, all[4].id()).await.unwrap());
        assert!(!nav.is_descendant_of(all[0].id(), city).await.unwrap());
    }

    #[tokio::test]
    async fn tree_and_audit() {
        let (nav, all) = seeded().await;
        let campaign = all[0].campaign_id();

        let forest = nav.tree(campaign).await.unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].size(), 5);
        assert!(nav.audit(campaign).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_location_is_not_found() {
        let (nav, _) = seeded().await;
        let result = nav.ancestors(LocationId::new()).await;
        assert!(matches!(result, Err(LocationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn corrupt_data_is_reported_not_looped() {
        let campaign = CampaignId::new();
        let a = loc(campaign, "A", None);
        let b = loc(campaign, "B", Some(a.id()));
        let a = a.with_parent(Some(b.id()));
        let a_id = a.id();

        let repo = InMemoryLocationRepo::new();
        repo.insert_unchecked(a).await;
        repo.insert_unchecked(b).await;
        let nav = LocationNavigation::new(Arc::new(repo), MaxDepth::default());

        let result = nav.depth(a_id).await;
        assert!(matches!(result, Err(LocationError::CorruptHierarchy { .. })));
        assert!(!nav.audit(campaign).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let mut repo = MockLocationRepo::new();
        repo.expect_get()
            .returning(|_| Err(RepoError::database("get_location", "connection reset")));
        let nav = LocationNavigation::new(Arc::new(repo), MaxDepth::default());

        let result = nav.root(LocationId::new()).await;
        assert!(matches!(result, Err(LocationError::Repo(_))));
    }
}
