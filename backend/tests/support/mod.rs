//! Shared helpers for integration tests that need a real PostgreSQL.
//!
//! Store-backed suites run against an embedded cluster. Setup failures fail
//! the suite unless `SKIP_TEST_CLUSTER` is set; see [`cluster_skip`].

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{provision_template_database, shared_cluster};
