//! Whole-snapshot integrity audit.
//!
//! Unlike the bounded walks used on write paths, the audit never fails fast:
//! it visits every node and lists everything wrong with the stored tree.

use std::collections::HashSet;

use serde::Serialize;

use super::CampaignTree;
use crate::{CampaignId, LocationId};

/// One violated invariant found in stored data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// The parent pointer references no location in the campaign
    DanglingParent {
        location_id: LocationId,
        parent_id: LocationId,
    },
    /// The location itself belongs to another campaign
    ForeignLocation {
        location_id: LocationId,
        campaign_id: CampaignId,
    },
    /// The location is its own ancestor
    Cycle { location_id: LocationId },
    /// The location sits deeper than the campaign allows
    TooDeep {
        location_id: LocationId,
        depth: usize,
        max_depth: usize,
    },
}

enum Walk {
    Root { depth: usize },
    InCycle,
    Broken,
}

impl CampaignTree {
    /// List every integrity issue in the snapshot, ordered by location id.
    pub fn audit(&self) -> Vec<IntegrityIssue> {
        let mut ids: Vec<LocationId> = self.locations().map(|l| l.id()).collect();
        ids.sort();

        let mut issues = Vec::new();
        for id in ids {
            let Some(location) = self.get(id) else {
                continue;
            };

            if location.campaign_id() != self.campaign_id() {
                issues.push(IntegrityIssue::ForeignLocation {
                    location_id: id,
                    campaign_id: location.campaign_id(),
                });
            }

            if let Some(parent_id) = location.parent_id() {
                if !self.contains(parent_id) {
                    issues.push(IntegrityIssue::DanglingParent {
                        location_id: id,
                        parent_id,
                    });
                    continue;
                }
            }

            match self.walk_to_root(id) {
                Walk::Root { depth } if !self.max_depth().allows(depth) => {
                    issues.push(IntegrityIssue::TooDeep {
                        location_id: id,
                        depth,
                        max_depth: self.max_depth().levels(),
                    });
                }
                Walk::InCycle => issues.push(IntegrityIssue::Cycle { location_id: id }),
                Walk::Root { .. } | Walk::Broken => {}
            }
        }
        issues
    }

    /// Unbounded walk guarded by a visited set, for auditing only.
    fn walk_to_root(&self, id: LocationId) -> Walk {
        let mut seen = HashSet::from([id]);
        let mut depth = 0;
        let mut current = id;

        loop {
            let Some(parent_id) = self.get(current).and_then(|l| l.parent_id()) else {
                return Walk::Root { depth };
            };
            if parent_id == id {
                return Walk::InCycle;
            }
            if !seen.insert(parent_id) || !self.contains(parent_id) {
                // Leads into a cycle elsewhere or past a dangling pointer;
                // that node reports the problem itself.
                return Walk::Broken;
            }
            depth += 1;
            current = parent_id;
        }
    }
}
