//! `SKIP_TEST_CLUSTER` policy for suites that need embedded PostgreSQL.

fn skip_requested() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .is_ok_and(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Skip the test with a marker line when `SKIP_TEST_CLUSTER` is truthy,
/// otherwise fail loudly so a broken cluster never passes silently in CI.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if skip_requested() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        return None;
    }
    panic!("test cluster setup failed: {reason}; set SKIP_TEST_CLUSTER=1 to skip");
}
