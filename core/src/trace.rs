//! Evaluation trace types for debugging match behaviour.
//!
//! Trace types mirror the runtime types ([`CompiledPattern`](crate::CompiledPattern),
//! [`MatchTable`](crate::MatchTable)) but capture evaluation results instead of
//! inputs.
//!
//! # Two Levels of Trace
//!
//! - [`PatternTrace`]: per-pattern: which sub-tests matched?
//! - [`MatchTrace`]: per-table: which arms were tried, which one fired?
//!
//! # Example
//!
//! ```ignore
//! let trace = table.evaluate_with_trace(&subject);
//! println!("Result: {:?}", trace.result);
//! for step in &trace.steps {
//!     println!("  arm[{}]: matched={}", step.index, step.matched);
//! }
//! ```

use std::fmt;

/// Trace of a pattern test.
///
/// Shapes record every declared field or index (no short-circuit) for
/// maximum debugging value. The `matched` result is still correct.
pub enum PatternTrace {
    /// Strict equality against a literal.
    Literal {
        /// Whether the subject equalled the literal.
        matched: bool,
        /// The literal (Debug format).
        expected: String,
        /// The subject (Debug format).
        actual: String,
    },
    /// Partial object shape.
    Object {
        /// Whether the subject was an object and every field matched.
        matched: bool,
        /// Whether the subject was an object at all.
        object_like: bool,
        /// Trace of each declared key, in declaration order.
        fields: Vec<(String, PatternTrace)>,
    },
    /// Partial array shape.
    Array {
        /// Whether the subject was an array and every index matched.
        matched: bool,
        /// Whether the subject was an array at all.
        array_like: bool,
        /// Trace of each declared index.
        items: Vec<PatternTrace>,
    },
    /// Predicate test.
    Predicate {
        /// Whether the predicate matched.
        matched: bool,
        /// Debug description of the predicate kind.
        predicate: String,
        /// The tested value (Debug format).
        value: String,
    },
}

impl PatternTrace {
    /// Get the overall match result.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Literal { matched, .. }
            | Self::Object { matched, .. }
            | Self::Array { matched, .. }
            | Self::Predicate { matched, .. } => *matched,
        }
    }
}

impl fmt::Debug for PatternTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal {
                matched,
                expected,
                actual,
            } => f
                .debug_struct("Literal")
                .field("matched", matched)
                .field("expected", expected)
                .field("actual", actual)
                .finish(),
            Self::Object {
                matched,
                object_like,
                fields,
            } => f
                .debug_struct("Object")
                .field("matched", matched)
                .field("object_like", object_like)
                .field("fields", fields)
                .finish(),
            Self::Array {
                matched,
                array_like,
                items,
            } => f
                .debug_struct("Array")
                .field("matched", matched)
                .field("array_like", array_like)
                .field("items", items)
                .finish(),
            Self::Predicate {
                matched,
                predicate,
                value,
            } => f
                .debug_struct("Predicate")
                .field("matched", matched)
                .field("predicate", predicate)
                .field("value", value)
                .finish(),
        }
    }
}

/// Trace of a full [`MatchTable`](crate::MatchTable) evaluation.
///
/// # INV: `result` == `evaluate()` result
///
/// The `result` field always equals what
/// [`MatchTable::evaluate()`](crate::MatchTable::evaluate) returns for the same
/// subject.
pub struct MatchTrace<A> {
    /// The final result (identical to what `evaluate()` returns).
    pub result: Option<A>,
    /// Trace of each arm that was tried, in order.
    /// Stops after the first match (preserves first-match-wins).
    pub steps: Vec<ArmStep>,
    /// Whether the `on_no_match` fallback was used.
    pub used_fallback: bool,
}

impl<A> MatchTrace<A> {
    /// Index of the arm that fired, if any.
    #[must_use]
    pub fn fired_arm(&self) -> Option<usize> {
        self.steps.iter().find(|s| s.matched).map(|s| s.index)
    }
}

impl<A: fmt::Debug> fmt::Debug for MatchTrace<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchTrace")
            .field("result", &self.result)
            .field("steps", &self.steps)
            .field("used_fallback", &self.used_fallback)
            .finish()
    }
}

/// One arm's evaluation in a trace.
pub struct ArmStep {
    /// Index in the arm list (0-based).
    pub index: usize,
    /// Did the pattern match?
    pub matched: bool,
    /// Rendered narrowed type of the arm's pattern.
    pub narrowed: String,
    /// Full pattern trace.
    pub pattern_trace: PatternTrace,
}

impl fmt::Debug for ArmStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmStep")
            .field("index", &self.index)
            .field("matched", &self.matched)
            .field("narrowed", &self.narrowed)
            .field("pattern_trace", &self.pattern_trace)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate_trace(matched: bool) -> PatternTrace {
        PatternTrace::Predicate {
            matched,
            predicate: "TypeOf(String)".into(),
            value: "String(\"odie\")".into(),
        }
    }

    #[test]
    fn pattern_trace_matched() {
        assert!(predicate_trace(true).matched());
        let trace = PatternTrace::Object {
            matched: false,
            object_like: false,
            fields: vec![],
        };
        assert!(!trace.matched());
    }

    #[test]
    fn pattern_trace_debug_format() {
        let debug = format!("{:?}", predicate_trace(true));
        assert!(debug.contains("TypeOf"));
        assert!(debug.contains("odie"));
    }

    #[test]
    fn match_trace_fired_arm() {
        let trace: MatchTrace<String> = MatchTrace {
            result: Some("second".into()),
            steps: vec![
                ArmStep {
                    index: 0,
                    matched: false,
                    narrowed: "string".into(),
                    pattern_trace: predicate_trace(false),
                },
                ArmStep {
                    index: 1,
                    matched: true,
                    narrowed: "string".into(),
                    pattern_trace: predicate_trace(true),
                },
            ],
            used_fallback: false,
        };
        assert_eq!(trace.fired_arm(), Some(1));
        assert!(format!("{trace:?}").contains("second"));
    }
}
