//! `MatchTable`: reusable first-match-wins dispatch
//!
//! Where [`Match`](crate::Match) is built for one subject and consumed, a
//! `MatchTable` is built once (typically from config) and evaluated against
//! many subjects. Arms pair a compiled pattern with a cloneable action.

use crate::{ArmStep, CompiledPattern, IntoCompiled, MatchTrace, PatternError, Value, MAX_ARMS};
use std::fmt::Debug;

/// One arm of a [`MatchTable`]: pattern + action.
#[derive(Clone)]
pub struct Arm<A: Clone + Send + Sync + 'static> {
    /// The pattern to test.
    pub pattern: CompiledPattern,

    /// What to return when the pattern matches.
    pub action: A,
}

impl<A: Clone + Send + Sync + 'static> Arm<A> {
    /// Create a new arm.
    pub fn new(pattern: CompiledPattern, action: A) -> Self {
        Self { pattern, action }
    }

    /// Compile `pattern` and pair it with `action`.
    ///
    /// # Errors
    ///
    /// Returns the [`PatternError`] if the pattern fails to compile.
    pub fn compile(pattern: impl IntoCompiled, action: A) -> Result<Self, PatternError> {
        Ok(Self::new(pattern.into_compiled()?, action))
    }

    /// Test the pattern against a subject.
    pub fn matches(&self, subject: &Value) -> bool {
        self.pattern.test(subject)
    }
}

impl<A: Clone + Send + Sync + Debug + 'static> Debug for Arm<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arm")
            .field("pattern", &self.pattern)
            .field("action", &self.action)
            .finish()
    }
}

/// Reusable match table with first-match-wins semantics.
///
/// # INV: First-match-wins
///
/// Arms are evaluated in order. The first matching pattern terminates
/// evaluation, even if later patterns would also match.
///
/// # Example
///
/// ```
/// use pura::{object, predicate, Arm, MatchTable, Value};
///
/// let table = MatchTable::new(
///     vec![
///         Arm::compile(object([("kind", "dog")]), "dog").unwrap(),
///         Arm::compile(object([("name", predicate::string())]), "named").unwrap(),
///     ],
///     Some("other"),
/// );
///
/// let garfield = Value::object([("kind", "cat"), ("name", "garfield")]);
/// assert_eq!(table.evaluate(&garfield), Some("named"));
/// assert_eq!(table.evaluate(&Value::from(3)), Some("other"));
/// ```
#[derive(Clone)]
pub struct MatchTable<A: Clone + Send + Sync + 'static> {
    /// The arms to evaluate, in order.
    pub arms: Vec<Arm<A>>,

    /// Fallback when no arm matches.
    pub on_no_match: Option<A>,
}

impl<A: Clone + Send + Sync + 'static> MatchTable<A> {
    /// Create a new table.
    pub fn new(arms: Vec<Arm<A>>, on_no_match: Option<A>) -> Self {
        Self { arms, on_no_match }
    }

    /// Create an empty table (no arms, no fallback).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            arms: Vec::new(),
            on_no_match: None,
        }
    }

    /// Evaluate against a subject.
    ///
    /// Returns the action of the first matching arm, or the `on_no_match`
    /// action if nothing matches.
    pub fn evaluate(&self, subject: &Value) -> Option<A> {
        for (index, arm) in self.arms.iter().enumerate() {
            if arm.matches(subject) {
                tracing::debug!(arm = index, "table arm matched");
                return Some(arm.action.clone());
            }
        }
        tracing::debug!(
            subject_type = subject.type_name(),
            fallback = self.on_no_match.is_some(),
            "no table arm matched"
        );
        self.on_no_match.clone()
    }

    /// Evaluate with a full trace of every arm tried.
    ///
    /// `trace.result` always equals [`evaluate`](Self::evaluate) for the same
    /// subject. Steps stop at the first match.
    pub fn evaluate_with_trace(&self, subject: &Value) -> MatchTrace<A> {
        let mut steps = Vec::new();
        for (index, arm) in self.arms.iter().enumerate() {
            let pattern_trace = arm.pattern.test_with_trace(subject);
            let matched = pattern_trace.matched();
            steps.push(ArmStep {
                index,
                matched,
                narrowed: arm.pattern.narrowed_type().to_string(),
                pattern_trace,
            });
            if matched {
                return MatchTrace {
                    result: Some(arm.action.clone()),
                    steps,
                    used_fallback: false,
                };
            }
        }
        MatchTrace {
            result: self.on_no_match.clone(),
            steps,
            used_fallback: self.on_no_match.is_some(),
        }
    }

    /// Returns the number of arms.
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// Returns `true` if there are no arms.
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Returns `true` if there is an `on_no_match` fallback.
    pub fn has_fallback(&self) -> bool {
        self.on_no_match.is_some()
    }

    /// Validate this table against safety constraints.
    ///
    /// Call this at config load time to catch errors early.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::TooManyArms`] past [`MAX_ARMS`].
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.arms.len() > MAX_ARMS {
            return Err(PatternError::TooManyArms {
                count: self.arms.len(),
                max: MAX_ARMS,
            });
        }
        Ok(())
    }
}

impl<A: Clone + Send + Sync + Debug + 'static> Debug for MatchTable<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchTable")
            .field("arms_len", &self.arms.len())
            .field("has_fallback", &self.on_no_match.is_some())
            .finish()
    }
}
