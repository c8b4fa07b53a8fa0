//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Location storage (in-memory or SQLite)
//! - Campaign membership and character lookups (owned by other subsystems)
//! - Mutation notifications (audit consumers)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::LocationRepo;

// =============================================================================
// Collaborator Ports
// =============================================================================
pub use external::{CampaignDirectory, CharacterDirectory, LocationEventSink};

// =============================================================================
// Types
// =============================================================================
pub use error::RepoError;
pub use testing::ClockPort;
pub use types::{CharacterRef, LocationFilter, ParentScope};

// =============================================================================
// Mocks (test only)
// =============================================================================
#[cfg(test)]
pub use external::{MockCampaignDirectory, MockCharacterDirectory, MockLocationEventSink};
#[cfg(test)]
pub use repos::MockLocationRepo;
#[cfg(test)]
pub use testing::MockClockPort;
