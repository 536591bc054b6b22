//! `TypeTag`: runtime description of a narrowed type.
//!
//! Every compiled pattern carries the type its matches are known to have.
//! Tags are documentation at the value level (a matched subject is passed
//! through unchanged) and feed the statically typed [`Typed`](crate::Typed)
//! layer, traces, and error messages.

use crate::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The type a pattern narrows its subject to.
///
/// Rendered with `Display` in a TypeScript-like notation:
///
/// ```
/// use pura::{predicate, compile, object};
///
/// let pattern = compile(&object([("name", object([("first", predicate::string())]))])).unwrap();
/// assert_eq!(pattern.narrowed_type().to_string(), "{ name: { first: string } }");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TypeTag {
    /// Nothing is known.
    Unknown,
    /// Either sentinel (`undefined | null`).
    Nothing,
    /// The `undefined` sentinel.
    Undefined,
    /// The `null` sentinel.
    Null,
    /// Any boolean.
    Boolean,
    /// Any number.
    Number,
    /// Any string.
    String,
    /// Exactly this primitive value.
    Literal(Value),
    /// Array whose every element has the inner type.
    Array(Box<TypeTag>),
    /// Array whose leading positions have the listed types; trailing
    /// positions are unconstrained.
    Tuple(Vec<TypeTag>),
    /// Object whose every value has the inner type (keys unconstrained).
    Record(Box<TypeTag>),
    /// Object exposing at least these keys; other keys are unconstrained.
    Shape(BTreeMap<String, TypeTag>),
    /// Any of the member types.
    Union(Vec<TypeTag>),
    /// A caller-defined type, identified by name.
    Custom(String),
}

impl TypeTag {
    /// Tag for a primitive literal. Sentinels map to their own tags.
    #[must_use]
    pub fn literal(value: &Value) -> Self {
        match value {
            Value::Undefined => Self::Undefined,
            Value::Null => Self::Null,
            other => Self::Literal(other.clone()),
        }
    }

    /// Returns `true` if nothing is known about the type.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Nothing => f.write_str("undefined | null"),
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Boolean => f.write_str("boolean"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Literal(value) => write_literal(f, value),
            Self::Array(inner) => match inner.as_ref() {
                Self::Union(_) | Self::Nothing => write!(f, "({inner})[]"),
                _ => write!(f, "{inner}[]"),
            },
            Self::Tuple(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(", ...unknown[]]")
            }
            Self::Record(inner) => write!(f, "Record<string, {inner}>"),
            Self::Shape(fields) => {
                if fields.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, tag)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{key}: {tag}")?;
                }
                f.write_str(" }")
            }
            Self::Union(members) => {
                if members.is_empty() {
                    return f.write_str("never");
                }
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Self::Custom(name) => f.write_str(name),
        }
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "{s:?}"),
        Value::Number(n) => write!(f, "{n}"),
        Value::Bool(b) => write!(f, "{b}"),
        other => f.write_str(other.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_primitives() {
        assert_eq!(TypeTag::String.to_string(), "string");
        assert_eq!(TypeTag::Nothing.to_string(), "undefined | null");
        assert_eq!(TypeTag::literal(&Value::from("odie")).to_string(), "\"odie\"");
        assert_eq!(TypeTag::literal(&Value::from(3)).to_string(), "3");
        assert_eq!(TypeTag::literal(&Value::Null), TypeTag::Null);
    }

    #[test]
    fn test_display_composites() {
        let union = TypeTag::Union(vec![TypeTag::String, TypeTag::Number]);
        assert_eq!(union.to_string(), "string | number");
        assert_eq!(TypeTag::Array(Box::new(union)).to_string(), "(string | number)[]");
        assert_eq!(
            TypeTag::Record(Box::new(TypeTag::Boolean)).to_string(),
            "Record<string, boolean>"
        );
        assert_eq!(
            TypeTag::Tuple(vec![TypeTag::Number]).to_string(),
            "[number, ...unknown[]]"
        );
        assert_eq!(TypeTag::Union(vec![]).to_string(), "never");
    }

    #[test]
    fn test_display_shape() {
        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), TypeTag::Number);
        fields.insert("b".to_string(), TypeTag::String);
        assert_eq!(TypeTag::Shape(fields).to_string(), "{ a: number; b: string }");
        assert_eq!(TypeTag::Shape(BTreeMap::new()).to_string(), "{}");
    }
}
