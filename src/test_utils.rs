//! Test utilities shared across test modules

use crate::paths::Paths;
use tempfile::TempDir;

/// Create a Paths struct for testing using a temporary directory
///
/// Mirrors the real ~/.envswitch/ layout inside the temp directory.
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    Paths::at(temp_dir.path().join(".envswitch"))
}
