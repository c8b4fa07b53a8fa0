//! Atlas location engine library.
//!
//! Hierarchical location trees scoped to campaigns: navigation, validated
//! mutations, and partial-success bulk writes.
//!
//! ## Structure
//!
//! - `use_cases/` - Navigation, mutation, and bulk orchestration
//! - `infrastructure/` - Ports and their adapters (SQLite, in-memory, events)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

/// End-to-end tests over the composed engine.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
