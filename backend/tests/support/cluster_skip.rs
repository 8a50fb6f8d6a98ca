//! Skip policy for suites that need the embedded cluster.
//!
//! Skipping is opt-in: without `SKIP_TEST_CLUSTER` a cluster that cannot
//! start fails the run instead of passing silently.

const SKIP_VAR: &str = "SKIP_TEST_CLUSTER";

/// Whether `SKIP_TEST_CLUSTER` is set to "1", "true" or "yes"
/// (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var(SKIP_VAR)
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Print a skip marker and return `None` when skipping is enabled.
///
/// # Panics
/// Panics with `reason` otherwise, so CI breakage is not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set {SKIP_VAR}=1 to skip.");
    }
}
