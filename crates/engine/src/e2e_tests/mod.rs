//! End-to-end tests over the composed engine.
//!
//! Each test builds a full [`App`](crate::App) against either the in-memory
//! store or a SQLite file in a temporary directory, and drives it only through
//! the public use cases.
//!
//! ```bash
//! cargo test -p atlas-engine --lib e2e_tests
//! ```

mod e2e_helpers;

pub use e2e_helpers::*;
