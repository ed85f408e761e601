//! Integration test suite for the franchise engine.
//!
//! Tests are organized by concern:
//! 1. Compaction and identifier density
//! 2. Delete policies
//! 3. Create/update validation
//! 4. Query pipeline and projections
//! 5. Property-based invariants
//! 6. Seed snapshots
//! 7. Concurrent writers

pub mod cascade_tests;
pub mod compaction_tests;
pub mod enforcer_tests;
pub mod helpers;
pub mod invariant_tests;
pub mod seed_tests;
