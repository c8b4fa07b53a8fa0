//! Campaign snapshot and navigation algorithms.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::Serialize;

use super::{HierarchyError, MaxDepth};
use crate::aggregates::Location;
use crate::{CampaignId, LocationId};

/// In-memory adjacency map of one campaign's locations.
///
/// Child lists are ordered by name (then id) so every traversal is
/// deterministic.
#[derive(Debug, Clone)]
pub struct CampaignTree {
    campaign_id: CampaignId,
    max_depth: MaxDepth,
    nodes: HashMap<LocationId, Location>,
    children: HashMap<Option<LocationId>, Vec<LocationId>>,
}

impl CampaignTree {
    /// An empty tree for a campaign with no locations yet.
    pub fn new(campaign_id: CampaignId, max_depth: MaxDepth) -> Self {
        Self {
            campaign_id,
            max_depth,
            nodes: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// Build a snapshot from a batch fetch of the campaign's locations.
    pub fn from_locations(
        campaign_id: CampaignId,
        max_depth: MaxDepth,
        locations: impl IntoIterator<Item = Location>,
    ) -> Self {
        let nodes: HashMap<LocationId, Location> =
            locations.into_iter().map(|l| (l.id(), l)).collect();

        let mut children: HashMap<Option<LocationId>, Vec<LocationId>> = HashMap::new();
        for location in nodes.values() {
            children
                .entry(location.parent_id())
                .or_default()
                .push(location.id());
        }
        for ids in children.values_mut() {
            ids.sort_by(|a, b| {
                let (la, lb) = (&nodes[a], &nodes[b]);
                la.name().cmp(lb.name()).then_with(|| a.cmp(b))
            });
        }

        Self {
            campaign_id,
            max_depth,
            nodes,
            children,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn max_depth(&self) -> MaxDepth {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All locations, in no particular order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.nodes.values()
    }

    pub(super) fn node(&self, id: LocationId) -> Result<&Location, HierarchyError> {
        self.nodes
            .get(&id)
            .ok_or(HierarchyError::UnknownLocation(id))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Direct children of `parent`, or the roots when `parent` is `None`.
    pub fn children(&self, parent: Option<LocationId>) -> &[LocationId] {
        self.children
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn roots(&self) -> &[LocationId] {
        self.children(None)
    }

    /// Parent chain from the immediate parent up to the root; empty for a root.
    pub fn ancestors(&self, id: LocationId) -> Result<Vec<LocationId>, HierarchyError> {
        let limit = self.max_depth.walk_limit();
        let mut chain = Vec::new();
        let mut current = self.node(id)?;

        while let Some(parent_id) = current.parent_id() {
            if parent_id == id {
                return Err(HierarchyError::CycleDetected { location_id: id });
            }
            if chain.len() >= limit {
                return Err(HierarchyError::WalkLimitExceeded {
                    location_id: id,
                    limit,
                });
            }
            let parent = self
                .nodes
                .get(&parent_id)
                .ok_or(HierarchyError::DanglingParent {
                    location_id: current.id(),
                    parent_id,
                })?;
            chain.push(parent_id);
            current = parent;
        }

        Ok(chain)
    }

    /// Number of ancestors; a root has depth 0.
    pub fn depth(&self, id: LocationId) -> Result<usize, HierarchyError> {
        Ok(self.ancestors(id)?.len())
    }

    /// Topmost ancestor, or the node itself when it is a root.
    pub fn root(&self, id: LocationId) -> Result<LocationId, HierarchyError> {
        Ok(self.ancestors(id)?.last().copied().unwrap_or(id))
    }

    /// Other nodes under the same parent (other roots, for a root).
    pub fn siblings(&self, id: LocationId) -> Result<Vec<LocationId>, HierarchyError> {
        let node = self.node(id)?;
        Ok(self
            .children(node.parent_id())
            .iter()
            .copied()
            .filter(|sibling| *sibling != id)
            .collect())
    }

    /// Every node transitively parented by `id`, breadth-first.
    pub fn descendants(&self, id: LocationId) -> Result<Vec<LocationId>, HierarchyError> {
        self.node(id)?;
        let mut found = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for &child in self.children(Some(current)) {
                if !visited.insert(child) {
                    return Err(HierarchyError::CycleDetected { location_id: child });
                }
                found.push(child);
                queue.push_back(child);
            }
        }

        Ok(found)
    }

    /// True when `ancestor` appears in the parent chain of `id`.
    pub fn is_descendant_of(
        &self,
        id: LocationId,
        ancestor: LocationId,
    ) -> Result<bool, HierarchyError> {
        Ok(self.ancestors(id)?.contains(&ancestor))
    }

    /// Names from the root down to the node itself.
    pub fn full_path(&self, id: LocationId) -> Result<LocationPath, HierarchyError> {
        let node = self.node(id)?;
        let mut segments: Vec<String> = self
            .ancestors(id)?
            .iter()
            .rev()
            .filter_map(|ancestor| self.nodes.get(ancestor))
            .map(|l| l.name().to_string())
            .collect();
        segments.push(node.name().to_string());
        Ok(LocationPath { segments })
    }

    /// Levels below `id` in its deepest branch; 0 for a leaf.
    pub fn subtree_height(&self, id: LocationId) -> Result<usize, HierarchyError> {
        self.node(id)?;
        let mut height = 0;
        let mut visited = HashSet::from([id]);
        let mut stack = vec![(id, 0usize)];

        while let Some((current, level)) = stack.pop() {
            height = height.max(level);
            for &child in self.children(Some(current)) {
                if !visited.insert(child) {
                    return Err(HierarchyError::CycleDetected { location_id: child });
                }
                stack.push((child, level + 1));
            }
        }

        Ok(height)
    }

    /// Nested view of every tree reachable from the roots.
    pub fn forest(&self) -> Vec<LocationTreeNode> {
        self.roots()
            .iter()
            .filter_map(|&root| self.build_node(root, 0))
            .collect()
    }

    fn build_node(&self, id: LocationId, depth: usize) -> Option<LocationTreeNode> {
        let location = self.nodes.get(&id)?;
        Some(LocationTreeNode {
            id,
            name: location.name().to_string(),
            depth,
            children: self
                .children(Some(id))
                .iter()
                .filter_map(|&child| self.build_node(child, depth + 1))
                .collect(),
        })
    }
}

// ============================================================================
// Views
// ============================================================================

/// Root-first sequence of location names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationPath {
    segments: Vec<String>,
}

impl LocationPath {
    pub const SEPARATOR: &'static str = " > ";

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn join(&self, separator: &str) -> String {
        self.segments.join(separator)
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(Self::SEPARATOR))
    }
}

/// One node of a nested tree view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationTreeNode {
    pub id: LocationId,
    pub name: String,
    pub depth: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LocationTreeNode>,
}

impl LocationTreeNode {
    /// Number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(LocationTreeNode::size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::fixtures::{chain, loc};

    /// Realm
    /// ├── City
    /// │   ├── Market
    /// │   └── Tavern
    /// │       └── Cellar
    /// └── Forest
    /// Isle (second root)
    fn sample() -> (CampaignTree, HashMap<&'static str, LocationId>) {
        let campaign = CampaignId::new();
        let realm = loc(campaign, "Realm", None);
        let city = loc(campaign, "City", Some(realm.id()));
        let market = loc(campaign, "Market", Some(city.id()));
        let tavern = loc(campaign, "Tavern", Some(city.id()));
        let cellar = loc(campaign, "Cellar", Some(tavern.id()));
        let forest = loc(campaign, "Forest", Some(realm.id()));
        let isle = loc(campaign, "Isle", None);

        let ids = HashMap::from([
            ("realm", realm.id()),
            ("city", city.id()),
            ("market", market.id()),
            ("tavern", tavern.id()),
            ("cellar", cellar.id()),
            ("forest", forest.id()),
            ("isle", isle.id()),
        ]);
        let tree = CampaignTree::from_locations(
            campaign,
            MaxDepth::default(),
            [realm, city, market, tavern, cellar, forest, isle],
        );
        (tree, ids)
    }

    #[test]
    fn ancestors_run_from_parent_to_root() {
        let (tree, ids) = sample();
        assert_eq!(
            tree.ancestors(ids["cellar"]).unwrap(),
            vec![ids["tavern"], ids["city"], ids["realm"]]
        );
        assert!(tree.ancestors(ids["realm"]).unwrap().is_empty());
    }

    #[test]
    fn depth_and_root() {
        let (tree, ids) = sample();
        assert_eq!(tree.depth(ids["realm"]).unwrap(), 0);
        assert_eq!(tree.depth(ids["cellar"]).unwrap(), 3);
        assert_eq!(tree.root(ids["cellar"]).unwrap(), ids["realm"]);
        assert_eq!(tree.root(ids["isle"]).unwrap(), ids["isle"]);
    }

    #[test]
    fn ancestors_of_root_of_any_node_are_empty() {
        let (tree, ids) = sample();
        for id in ids.values() {
            let root = tree.root(*id).unwrap();
            assert!(tree.ancestors(root).unwrap().is_empty());
        }
    }

    #[test]
    fn descendants_cover_whole_subtree() {
        let (tree, ids) = sample();
        let mut found = tree.descendants(ids["city"]).unwrap();
        found.sort();
        let mut expected = vec![ids["market"], ids["tavern"], ids["cellar"]];
        expected.sort();
        assert_eq!(found, expected);
        assert!(tree.descendants(ids["forest"]).unwrap().is_empty());
    }

    #[test]
    fn siblings_exclude_self_and_include_other_roots() {
        let (tree, ids) = sample();
        assert_eq!(tree.siblings(ids["market"]).unwrap(), vec![ids["tavern"]]);
        assert_eq!(tree.siblings(ids["realm"]).unwrap(), vec![ids["isle"]]);
        assert!(tree.siblings(ids["cellar"]).unwrap().is_empty());
    }

    #[test]
    fn children_are_sorted_by_name() {
        let (tree, ids) = sample();
        assert_eq!(
            tree.children(Some(ids["realm"])),
            &[ids["city"], ids["forest"]]
        );
        assert_eq!(tree.roots(), &[ids["isle"], ids["realm"]]);
    }

    #[test]
    fn full_path_renders_root_first() {
        let (tree, ids) = sample();
        let path = tree.full_path(ids["cellar"]).unwrap();
        assert_eq!(path.segments(), &["Realm", "City", "Tavern", "Cellar"]);
        assert_eq!(path.to_string(), "Realm > City > Tavern > Cellar");
        assert_eq!(path.join("/"), "Realm/City/Tavern/Cellar");
    }

    #[test]
    fn is_descendant_of_follows_ancestors() {
        let (tree, ids) = sample();
        assert!(tree.is_descendant_of(ids["cellar"], ids["realm"]).unwrap());
        assert!(!tree.is_descendant_of(ids["realm"], ids["cellar"]).unwrap());
        assert!(!tree.is_descendant_of(ids["cellar"], ids["cellar"]).unwrap());
        assert!(!tree.is_descendant_of(ids["forest"], ids["city"]).unwrap());
    }

    #[test]
    fn subtree_height_counts_levels_below() {
        let (tree, ids) = sample();
        assert_eq!(tree.subtree_height(ids["realm"]).unwrap(), 3);
        assert_eq!(tree.subtree_height(ids["tavern"]).unwrap(), 1);
        assert_eq!(tree.subtree_height(ids["market"]).unwrap(), 0);
    }

    #[test]
    fn forest_nests_every_node() {
        let (tree, ids) = sample();
        let forest = tree.forest();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest.iter().map(LocationTreeNode::size).sum::<usize>(), 7);
        let realm = forest.iter().find(|n| n.id == ids["realm"]).unwrap();
        assert_eq!(realm.children[0].name, "City");
        assert_eq!(realm.children[0].children[1].children[0].depth, 3);
    }

    #[test]
    fn unknown_location_is_reported() {
        let (tree, _) = sample();
        let stranger = LocationId::new();
        assert_eq!(
            tree.ancestors(stranger),
            Err(HierarchyError::UnknownLocation(stranger))
        );
    }

    #[test]
    fn dangling_parent_is_corruption() {
        let campaign = CampaignId::new();
        let missing = LocationId::new();
        let orphan = loc(campaign, "Orphan", Some(missing));
        let orphan_id = orphan.id();
        let tree = CampaignTree::from_locations(campaign, MaxDepth::default(), [orphan]);

        let err = tree.ancestors(orphan_id).unwrap_err();
        assert!(err.is_corrupt());
        assert_eq!(
            err,
            HierarchyError::DanglingParent {
                location_id: orphan_id,
                parent_id: missing
            }
        );
    }

    #[test]
    fn existing_cycle_stops_at_walk_limit() {
        let campaign = CampaignId::new();
        let a = loc(campaign, "A", None);
        let b = loc(campaign, "B", Some(a.id()));
        let c = loc(campaign, "C", Some(b.id()));
        let a = a.with_parent(Some(b.id()));
        let c_id = c.id();
        let tree = CampaignTree::from_locations(campaign, MaxDepth::default(), [a, b, c]);

        assert!(matches!(
            tree.ancestors(c_id),
            Err(HierarchyError::WalkLimitExceeded { limit: 11, .. })
        ));
    }

    #[test]
    fn self_parent_is_detected_immediately() {
        let campaign = CampaignId::new();
        let a = loc(campaign, "A", None);
        let a_id = a.id();
        let a = a.with_parent(Some(a_id));
        let tree = CampaignTree::from_locations(campaign, MaxDepth::default(), [a]);

        assert_eq!(
            tree.depth(a_id),
            Err(HierarchyError::CycleDetected { location_id: a_id })
        );
    }

    #[test]
    fn ten_level_chain_reaches_depth_nine() {
        let campaign = CampaignId::new();
        let nodes = chain(campaign, 10);
        let last = nodes[9].id();
        let tree = CampaignTree::from_locations(campaign, MaxDepth::default(), nodes);
        assert_eq!(tree.depth(last).unwrap(), 9);
    }
}
