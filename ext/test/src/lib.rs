//! pura-test: conformance fixtures for pura
//!
//! Fixtures are YAML files describing a match table in the declarative
//! config format, a set of subjects, and the action each subject must
//! produce. The runner loads them through the production config path:
//! YAML → `MatchTableConfig<String>` → `MatchTableConfig::load()` → evaluate.
//!
//! # Example
//!
//! ```
//! use pura_test::fixture::Fixture;
//!
//! let fixture = Fixture::from_yaml(r#"
//! name: odie
//! config:
//!   arms:
//!     - pattern: { kind: dog }
//!       action: dog
//! cases:
//!   - name: hit
//!     subject: { kind: dog, name: odie }
//!     expect: dog
//! "#).unwrap();
//!
//! assert_eq!(fixture.run().unwrap(), 1);
//! ```

use std::path::{Path, PathBuf};

pub mod fixture;
pub mod logging;

/// The `fixtures/` directory at the workspace root.
#[must_use]
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::fixture::{Case, Fixture, FixtureError};
    pub use pura::prelude::*;
}
