//! Domain Events
//!
//! Coarse-grained events representing committed location mutations. They are
//! handed to the event sink port after each successful write and consumed by
//! audit or notification subsystems outside the engine.

mod location_events;

pub use location_events::LocationMutated;
