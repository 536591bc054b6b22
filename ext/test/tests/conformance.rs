//! Conformance tests: run every YAML fixture under `fixtures/`.
//!
//! Run with: cargo test -p pura-test --test conformance
//! Debug a failing case with: RUST_LOG=pura=debug cargo test -p pura-test --test conformance

use pura_test::fixture::Fixture;
use std::fs;
use std::path::Path;

/// Load and run all fixtures in one topic directory.
fn run_fixtures(dir: &Path) {
    pura_test::logging::init();
    assert!(
        dir.exists(),
        "Fixtures directory does not exist: {}",
        dir.display()
    );

    let mut entries: Vec<_> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .filter(|p| p.extension().is_some_and(|e| e == "yaml" || e == "yml"))
        .collect();
    entries.sort();
    assert!(!entries.is_empty(), "no fixtures in {}", dir.display());

    for path in entries {
        println!("Loading fixture file: {}", path.display());
        let yaml = fs::read_to_string(&path).expect("read yaml");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            match fixture.run() {
                Ok(cases) => println!("    -> {cases} cases passed"),
                Err(e) => panic!("{}: {e}", path.display()),
            }
        }
    }
}

#[test]
fn conformance_literals() {
    run_fixtures(&pura_test::fixtures_dir().join("01_literals"));
}

#[test]
fn conformance_predicates() {
    run_fixtures(&pura_test::fixtures_dir().join("02_predicates"));
}

#[test]
fn conformance_shapes() {
    run_fixtures(&pura_test::fixtures_dir().join("03_shapes"));
}

#[test]
fn conformance_semantics() {
    run_fixtures(&pura_test::fixtures_dir().join("04_semantics"));
}
