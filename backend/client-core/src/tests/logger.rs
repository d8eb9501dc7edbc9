// Unit tests for logger module initialization logic

use crate::logger::initialize;

use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't
/// panic or fail.
///
/// **WHY THIS MATTERS**: Shells may initialize logging from several startup
/// paths (setup hooks, tests). If the second call panicked or errored, it
/// would crash the application during startup.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are
/// removed, causing fern to panic when trying to set a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    let log_dir = TempDir::new().unwrap();

    let first = initialize(log_dir.path());
    let second = initialize(log_dir.path());

    assert!(first.is_ok(), "First initialization should succeed");
    assert!(
        second.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
}
