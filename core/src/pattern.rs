//! Pattern: what a match arm is declared with
//!
//! A pattern is a primitive literal, a partial object shape, a partial array
//! shape, or a [`Predicate`]. Patterns are plain data; [`compile`](crate::compile)
//! validates them and produces the reusable [`CompiledPattern`](crate::CompiledPattern).

use crate::{Predicate, Value};

/// A declared pattern.
///
/// # Example
///
/// ```
/// use pura::{object, predicate, Pattern, Value};
///
/// // { name: { first: $string } }
/// let pattern: Pattern = object([("name", object([("first", predicate::string())]))]);
///
/// // Literals convert directly.
/// let garfield: Pattern = "garfield".into();
/// ```
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Strict equality with a primitive value.
    Literal(Value),

    /// Partial object shape: every listed key must satisfy its pattern;
    /// unlisted subject keys are ignored.
    Object(Vec<(String, Pattern)>),

    /// Partial array shape: every listed index must satisfy its pattern;
    /// trailing subject elements are ignored.
    Array(Vec<Pattern>),

    /// A runtime interface.
    Predicate(Predicate),
}

impl Pattern {
    /// Convert a value into a pattern, turning arrays and objects into
    /// shapes recursively and everything else into literals.
    ///
    /// ```
    /// use pura::{compile, Pattern, Value};
    ///
    /// let pattern = Pattern::from_value(Value::object([("kind", "dog")]));
    /// let compiled = compile(&pattern).unwrap();
    /// assert!(compiled.test(&Value::object([("kind", "dog"), ("name", "odie")])));
    /// ```
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from_value).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_value(v)))
                    .collect(),
            ),
            other => Self::Literal(other),
        }
    }

    /// Returns `true` if this is a `Predicate` pattern.
    #[must_use]
    pub fn is_predicate(&self) -> bool {
        matches!(self, Self::Predicate(_))
    }

    /// Returns `true` if this is an object or array shape.
    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }
}

/// Build a partial object shape.
pub fn object<K, P, I>(entries: I) -> Pattern
where
    K: Into<String>,
    P: Into<Pattern>,
    I: IntoIterator<Item = (K, P)>,
{
    Pattern::Object(
        entries
            .into_iter()
            .map(|(k, p)| (k.into(), p.into()))
            .collect(),
    )
}

/// Build a partial array shape.
pub fn array<P, I>(items: I) -> Pattern
where
    P: Into<Pattern>,
    I: IntoIterator<Item = P>,
{
    Pattern::Array(items.into_iter().map(Into::into).collect())
}

impl From<Predicate> for Pattern {
    fn from(p: Predicate) -> Self {
        Self::Predicate(p)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self::Literal(Value::from(s))
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Self::Literal(Value::String(s))
    }
}

impl From<f64> for Pattern {
    fn from(n: f64) -> Self {
        Self::Literal(Value::Number(n))
    }
}

impl From<i32> for Pattern {
    fn from(n: i32) -> Self {
        Self::Literal(Value::from(n))
    }
}

impl From<bool> for Pattern {
    fn from(b: bool) -> Self {
        Self::Literal(Value::Bool(b))
    }
}

impl From<Value> for Pattern {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate;

    #[test]
    fn test_from_value_builds_shapes() {
        let pattern = Pattern::from_value(Value::object([("tags", Value::array(["a"]))]));
        let Pattern::Object(entries) = pattern else {
            panic!("expected object shape");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "tags");
        assert!(matches!(&entries[0].1, Pattern::Array(items) if items.len() == 1));
    }

    #[test]
    fn test_literal_conversions() {
        assert!(matches!(Pattern::from("x"), Pattern::Literal(Value::String(_))));
        assert!(matches!(Pattern::from(1), Pattern::Literal(Value::Number(_))));
        assert!(matches!(Pattern::from(true), Pattern::Literal(Value::Bool(true))));
        assert!(matches!(Pattern::from(Value::Null), Pattern::Literal(Value::Null)));
    }

    #[test]
    fn test_builders() {
        let p = object([("age", predicate::number())]);
        assert!(p.is_shape());
        let p = array([Pattern::from(1), predicate::string().into()]);
        assert!(matches!(p, Pattern::Array(ref items) if items.len() == 2));
        assert!(Pattern::from(predicate::nothing()).is_predicate());
    }
}
