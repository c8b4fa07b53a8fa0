//! Use cases - User story orchestration.
//!
//! Use cases sit between the ports in `infrastructure` and whatever surface
//! embeds the engine.

pub mod locations;

pub use locations::LocationUseCases;
