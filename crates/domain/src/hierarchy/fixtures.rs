use chrono::Utc;

use crate::aggregates::Location;
use crate::value_objects::LocationName;
use crate::{CampaignId, LocationId, UserId};

pub(crate) fn loc(campaign: CampaignId, name: &str, parent: Option<LocationId>) -> Location {
    Location::new(
        campaign,
        LocationName::new(name).unwrap(),
        UserId::new(),
        Utc::now(),
    )
    .with_parent(parent)
}

/// A straight line of `len` locations, root first.
pub(crate) fn chain(campaign: CampaignId, len: usize) -> Vec<Location> {
    let mut nodes: Vec<Location> = Vec::with_capacity(len);
    for level in 0..len {
        let parent = nodes.last().map(Location::id);
        nodes.push(loc(campaign, &format!("Level {}", level), parent));
    }
    nodes
}
