//! E2E test helpers for constructing the full application stack.

use std::sync::Arc;

use atlas_domain::{
    CampaignId, CampaignRole, DefaultPermissionPolicy, Location, LocationId, LocationMutated,
    UserId,
};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::App;
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::events::ChannelEventSink;
use crate::infrastructure::memory::{InMemoryCampaignDirectory, InMemoryLocationRepo};
use crate::infrastructure::ports::LocationRepo;
use crate::infrastructure::sqlite::SqliteLocationRepo;
use crate::use_cases::locations::CreateLocationInput;

/// A composed engine with one campaign and a game master ready to act.
pub struct TestEngine {
    pub app: App,
    pub directory: Arc<InMemoryCampaignDirectory>,
    pub events: UnboundedReceiver<LocationMutated>,
    pub campaign: CampaignId,
    pub gm: UserId,
    /// Keeps the SQLite file alive for the test's duration
    _dir: Option<TempDir>,
}

pub async fn in_memory_engine(config: EngineConfig) -> TestEngine {
    build(Arc::new(InMemoryLocationRepo::new()), config, None).await
}

pub async fn sqlite_engine(config: EngineConfig) -> TestEngine {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("atlas.db");
    let repo = SqliteLocationRepo::new(&path.to_string_lossy())
        .await
        .expect("open sqlite store");
    build(Arc::new(repo), config, Some(dir)).await
}

async fn build(
    repo: Arc<dyn LocationRepo>,
    config: EngineConfig,
    dir: Option<TempDir>,
) -> TestEngine {
    let campaign = CampaignId::new();
    let gm = UserId::new();
    let directory = Arc::new(InMemoryCampaignDirectory::new());
    directory.add_campaign(campaign).await;
    directory.set_role(campaign, gm, CampaignRole::Gm).await;

    let (sink, events) = ChannelEventSink::new();
    let clock = FixedClock(
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
    );
    let app = App::with_clock(
        repo,
        directory.clone(),
        directory.clone(),
        Arc::new(sink),
        Arc::new(DefaultPermissionPolicy),
        Arc::new(clock),
        &config,
    );

    TestEngine {
        app,
        directory,
        events,
        campaign,
        gm,
        _dir: dir,
    }
}

impl TestEngine {
    /// Create a location as the game master.
    pub async fn create(&self, name: &str, parent: Option<LocationId>) -> Location {
        let mut input = CreateLocationInput::new(self.campaign, name);
        input.parent_id = parent;
        self.app
            .use_cases
            .locations
            .mutations
            .create(self.gm, input)
            .await
            .unwrap_or_else(|e| panic!("create {name}: {e}"))
    }

    /// Create a straight chain of `len` locations and return them root first.
    pub async fn chain(&self, prefix: &str, len: usize) -> Vec<Location> {
        let mut nodes: Vec<Location> = Vec::with_capacity(len);
        for i in 0..len {
            let parent = nodes.last().map(Location::id);
            nodes.push(self.create(&format!("{prefix} {i}"), parent).await);
        }
        nodes
    }

    /// Add a member to the campaign.
    pub async fn member(&self, role: CampaignRole) -> UserId {
        let user = UserId::new();
        self.directory.set_role(self.campaign, user, role).await;
        user
    }

    /// Everything emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<LocationMutated> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }

    pub async fn stored(&self, id: LocationId) -> Option<Location> {
        self.app
            .repositories
            .location
            .get(id)
            .await
            .expect("read location")
    }
}
