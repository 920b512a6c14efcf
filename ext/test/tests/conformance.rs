//! Conformance tests that run YAML fixtures against xbind
//!
//! Run with: cargo test -p xbind-test --test conformance --features xbind-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use std::fs;
use std::path::{Path, PathBuf};
use xbind_test::fixture::Fixture;

/// Get the conformance fixture directory relative to the workspace root
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let ext_test = Path::new(manifest_dir);

    // Go up: ext/test -> ext -> workspace root
    let root = ext_test
        .parent() // ext
        .and_then(|p| p.parent()) // root
        .expect("Could not find workspace root");

    root.join("conformance").join("tests")
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    if !dir.exists() {
        panic!("Fixtures directory does not exist: {}", dir.display());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|e| e == "yaml" || e == "yml"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "no fixtures in {}", dir.display());

    for path in paths {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");

        // Parse potentially multiple fixtures (separated by ---)
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_objects_and_properties() {
    run_fixtures_in_dir(&fixtures_dir().join("01_objects"));
}

#[test]
fn test_patterns_and_ordering() {
    run_fixtures_in_dir(&fixtures_dir().join("02_patterns"));
}

#[test]
fn test_calls() {
    run_fixtures_in_dir(&fixtures_dir().join("03_calls"));
}

#[test]
fn test_construction() {
    run_fixtures_in_dir(&fixtures_dir().join("04_construction"));
}

#[test]
fn test_errors() {
    run_fixtures_in_dir(&fixtures_dir().join("05_errors"));
}
