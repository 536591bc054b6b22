//! Conformance fixture runner.
//!
//! A fixture is a match table written in the declarative config format
//! (`MatchTableConfig<String>`) plus a list of subjects and the action each
//! one must produce. Fixture files hold several YAML documents separated by
//! `---`:
//!
//! ```yaml
//! name: dog_before_named
//! config:
//!   arms:
//!     - pattern: { kind: dog }
//!       action: dog
//!     - pattern: { name: { $type: string } }
//!       action: named
//! cases:
//!   - name: odie
//!     subject: { kind: dog, name: odie }
//!     expect: dog
//!   - name: number
//!     subject: 3
//!     expect: null
//! ```
//!
//! A case without `subject` matches against `undefined`.

use pura::{MatchTable, MatchTableConfig, PatternError, Value};
use serde::{Deserialize, Deserializer};

/// A conformance test fixture.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub config: serde_json::Value,
    #[serde(default)]
    pub cases: Vec<Case>,
    #[serde(default)]
    pub expect_error: bool,
}

/// A test case within a fixture.
#[derive(Debug, Deserialize)]
pub struct Case {
    pub name: String,
    #[serde(default, deserialize_with = "present")]
    pub subject: Option<serde_json::Value>,
    pub expect: Option<String>,
}

/// Distinguish an explicit `null` subject from a missing one.
fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(d).map(Some)
}

/// Why a fixture failed.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// The fixture's config is not a valid `MatchTableConfig<String>`.
    #[error("fixture '{fixture}': config does not parse: {reason}")]
    Parse { fixture: String, reason: String },

    /// The config parsed but failed to load.
    #[error("fixture '{fixture}': config failed to load: {error}")]
    Load {
        fixture: String,
        error: PatternError,
    },

    /// An error was expected but the table loaded.
    #[error("fixture '{fixture}': expected a load error, but the table loaded")]
    UnexpectedLoad { fixture: String },

    /// A case produced the wrong action.
    #[error("fixture '{fixture}', case '{case}': expected {expected:?}, got {actual:?}")]
    Mismatch {
        fixture: String,
        case: String,
        expected: Option<String>,
        actual: Option<String>,
    },

    /// `evaluate_with_trace` disagreed with `evaluate`.
    #[error("fixture '{fixture}', case '{case}': trace result {traced:?} != evaluate result {evaluated:?}")]
    TraceDivergence {
        fixture: String,
        case: String,
        traced: Option<String>,
        evaluated: Option<String>,
    },
}

impl Fixture {
    /// Parse a single fixture from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Build the match table this fixture describes.
    pub fn load(&self) -> Result<MatchTable<String>, FixtureError> {
        let config: MatchTableConfig<String> = serde_json::from_value(self.config.clone())
            .map_err(|e| FixtureError::Parse {
                fixture: self.name.clone(),
                reason: e.to_string(),
            })?;
        config.load().map_err(|error| FixtureError::Load {
            fixture: self.name.clone(),
            error,
        })
    }

    /// Run every case. Returns the number of cases checked.
    ///
    /// For `expect_error` fixtures, succeeds only if parsing or loading fails.
    pub fn run(&self) -> Result<usize, FixtureError> {
        if self.expect_error {
            return match self.load() {
                Ok(_) => Err(FixtureError::UnexpectedLoad {
                    fixture: self.name.clone(),
                }),
                Err(e) => {
                    tracing::debug!(fixture = %self.name, error = %e, "expected load error");
                    Ok(0)
                }
            };
        }

        let table = self.load()?;
        for case in &self.cases {
            let subject = case.subject();
            let actual = table.evaluate(&subject);
            let traced = table.evaluate_with_trace(&subject).result;
            if traced != actual {
                return Err(FixtureError::TraceDivergence {
                    fixture: self.name.clone(),
                    case: case.name.clone(),
                    traced,
                    evaluated: actual,
                });
            }
            if actual != case.expect {
                return Err(FixtureError::Mismatch {
                    fixture: self.name.clone(),
                    case: case.name.clone(),
                    expected: case.expect.clone(),
                    actual,
                });
            }
            tracing::debug!(fixture = %self.name, case = %case.name, "case passed");
        }
        Ok(self.cases.len())
    }
}

impl Case {
    /// The subject as a [`Value`]; a missing subject is `undefined`.
    #[must_use]
    pub fn subject(&self) -> Value {
        self.subject.clone().map_or(Value::Undefined, Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: literal_odie
config:
  arms:
    - pattern: odie
      action: odie
  on_no_match: other
cases:
  - name: hit
    subject: odie
    expect: odie
  - name: miss
    subject: garfield
    expect: other
  - name: missing_subject
    expect: other
---
name: bad_directive
config:
  arms:
    - pattern: { $between: [1, 2] }
      action: x
expect_error: true
"#;

    #[test]
    fn test_parse_multi() {
        let fixtures = Fixture::from_yaml_multi(YAML).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].cases.len(), 3);
        assert!(fixtures[1].expect_error);
    }

    #[test]
    fn test_missing_and_null_subjects_differ() {
        let fixture = Fixture::from_yaml(
            r#"
name: sentinels
config: { arms: [] }
cases:
  - name: missing
  - name: "null"
    subject: null
"#,
        )
        .unwrap();
        assert_eq!(fixture.cases[0].subject(), Value::Undefined);
        assert_eq!(fixture.cases[1].subject(), Value::Null);
    }

    #[test]
    fn test_run() {
        for fixture in Fixture::from_yaml_multi(YAML).unwrap() {
            fixture.run().unwrap();
        }
    }

    #[test]
    fn test_mismatch_reported() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong
config:
  arms:
    - pattern: { $type: string }
      action: string
cases:
  - name: number
    subject: 1
    expect: string
"#,
        )
        .unwrap();
        assert!(matches!(
            fixture.run(),
            Err(FixtureError::Mismatch { actual: None, .. })
        ));
    }
}
