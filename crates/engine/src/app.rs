//! Application state and composition.

use std::sync::Arc;

use atlas_domain::PermissionPolicy;

use crate::infrastructure::{
    clock::SystemClock,
    config::EngineConfig,
    events::TracingEventSink,
    locks::CampaignLocks,
    ports::{CampaignDirectory, CharacterDirectory, ClockPort, LocationEventSink, LocationRepo},
};
use crate::use_cases::locations::{
    BulkLocations, LocationAccess, LocationMutations, LocationNavigation, LocationValidator,
};
use crate::use_cases::LocationUseCases;

/// Main application state.
///
/// Holds the injected ports and the use cases built on them.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for the injected ports.
pub struct Repositories {
    pub location: Arc<dyn LocationRepo>,
    pub campaigns: Arc<dyn CampaignDirectory>,
    pub characters: Arc<dyn CharacterDirectory>,
}

/// Container for all use cases.
pub struct UseCases {
    pub locations: LocationUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    ///
    /// Committed mutations are logged through [`TracingEventSink`].
    pub fn new(
        location_repo: Arc<dyn LocationRepo>,
        campaigns: Arc<dyn CampaignDirectory>,
        characters: Arc<dyn CharacterDirectory>,
        policy: Arc<dyn PermissionPolicy>,
        config: &EngineConfig,
    ) -> Self {
        Self::with_clock(
            location_repo,
            campaigns,
            characters,
            Arc::new(TracingEventSink),
            policy,
            Arc::new(SystemClock::new()),
            config,
        )
    }

    /// Same as [`App::new`] with an injected event sink and time source.
    pub fn with_clock(
        location_repo: Arc<dyn LocationRepo>,
        campaigns: Arc<dyn CampaignDirectory>,
        characters: Arc<dyn CharacterDirectory>,
        events: Arc<dyn LocationEventSink>,
        policy: Arc<dyn PermissionPolicy>,
        clock: Arc<dyn ClockPort>,
        config: &EngineConfig,
    ) -> Self {
        let locks = Arc::new(CampaignLocks::new());

        let navigation = Arc::new(LocationNavigation::new(
            location_repo.clone(),
            config.max_depth,
        ));
        let validator = LocationValidator::new(location_repo.clone(), characters.clone());
        let mutations = Arc::new(LocationMutations::new(
            location_repo.clone(),
            campaigns.clone(),
            events,
            clock,
            locks,
            navigation.clone(),
            validator,
        ));
        let access = Arc::new(LocationAccess::new(
            campaigns.clone(),
            characters.clone(),
            policy,
        ));
        let bulk = Arc::new(BulkLocations::new(
            mutations.clone(),
            navigation.clone(),
            access.clone(),
            config.max_batch_items,
        ));

        tracing::debug!(
            max_depth = %config.max_depth,
            max_batch_items = ?config.max_batch_items,
            "Location engine wired"
        );

        Self {
            repositories: Repositories {
                location: location_repo,
                campaigns,
                characters,
            },
            use_cases: UseCases {
                locations: LocationUseCases::new(navigation, mutations, access, bulk),
            },
        }
    }
}
