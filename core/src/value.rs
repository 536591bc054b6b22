//! `Value`: the dynamic subject every pattern is matched against
//!
//! Patterns are declared over arbitrary runtime data, so the engine works on an
//! erased value type: primitives, arrays, string-keyed objects, and an
//! extensible `Custom` variant for host payloads.
//!
//! # Sentinels
//!
//! `Undefined` and `Null` are the two non-value sentinels. Only the
//! [`nothing`](crate::predicate::nothing) predicate (or a literal of that exact
//! sentinel) matches them; shapes and other literals never match absence.
//!
//! # Extensibility via `Custom`
//!
//! For host types not covered by the built-in variants, implement
//! [`CustomValue`] and wrap in `Value::Custom(Arc::new(your_type))`.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Extension trait for host-specific values.
///
/// Custom values are opaque to the built-in predicates. Literal patterns
/// compare them by reference identity; custom predicates can downcast through
/// [`as_any`](Self::as_any).
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use pura::{CustomValue, Value};
///
/// #[derive(Debug)]
/// struct Handle(u32);
///
/// impl CustomValue for Handle {
///     fn custom_type_name(&self) -> &'static str {
///         "handle"
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let value = Value::Custom(Arc::new(Handle(7)));
/// assert!(value.is_custom());
/// assert_eq!(value.type_name(), "handle");
/// ```
pub trait CustomValue: Send + Sync + Debug {
    /// Returns a human-readable type identifier, e.g. `"file_handle"`.
    fn custom_type_name(&self) -> &'static str;

    /// Returns `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// A dynamic value.
///
/// # Equality
///
/// `PartialEq` is structural for arrays and objects and strict for
/// primitives (`NaN` never equals itself). `Custom` values are equal only
/// when they are the same allocation.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The "no value was provided" sentinel.
    #[default]
    Undefined,

    /// The "explicitly empty" sentinel.
    Null,

    /// Boolean.
    Bool(bool),

    /// Number. All numbers share one representation.
    Number(f64),

    /// String.
    String(String),

    /// Ordered sequence of values.
    Array(Vec<Value>),

    /// String-keyed mapping. Key order is not significant.
    Object(BTreeMap<String, Value>),

    /// Host payload implementing [`CustomValue`].
    Custom(Arc<dyn CustomValue>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Returns `true` for either sentinel (`Undefined` or `Null`).
    ///
    /// ```
    /// use pura::Value;
    ///
    /// assert!(Value::Undefined.is_nothing());
    /// assert!(Value::Null.is_nothing());
    /// assert!(!Value::from(0.0).is_nothing());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Returns `true` for scalar values that strict equality can compare:
    /// sentinels, booleans, numbers, strings, and custom values.
    #[inline]
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Returns `true` if this is an `Object`.
    #[inline]
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns `true` if this is an `Array`.
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns `true` if this is a `Custom` value.
    #[inline]
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Try to get the value as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get the value as a number.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a boolean.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as an array slice.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Try to get the value as an object map.
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get the inner custom value.
    #[inline]
    #[must_use]
    pub fn as_custom(&self) -> Option<&dyn CustomValue> {
        match self {
            Self::Custom(c) => Some(c.as_ref()),
            _ => None,
        }
    }

    /// Look up an object key. Missing keys and non-objects yield `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Look up an array index. Out-of-range indices and non-arrays yield `None`.
    #[must_use]
    pub fn index(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Returns a string describing the runtime type of this value.
    ///
    /// For `Custom` values this delegates to [`CustomValue::custom_type_name`].
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Custom(c) => c.custom_type_name(),
        }
    }

    /// Build an object from key/value pairs.
    ///
    /// ```
    /// use pura::Value;
    ///
    /// let dog = Value::object([("name", Value::from("odie")), ("age", Value::from(3))]);
    /// assert_eq!(dog.get("name").and_then(Value::as_str), Some("odie"));
    /// ```
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an array from values.
    pub fn array<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Undefined, Into::into)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// serde interop (feature = "serde")
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "serde")]
mod json {
    use super::Value;

    impl From<serde_json::Value> for Value {
        fn from(json: serde_json::Value) -> Self {
            match json {
                serde_json::Value::Null => Self::Null,
                serde_json::Value::Bool(b) => Self::Bool(b),
                serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
                serde_json::Value::String(s) => Self::String(s),
                serde_json::Value::Array(items) => {
                    Self::Array(items.into_iter().map(Self::from).collect())
                }
                serde_json::Value::Object(map) => {
                    Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
                }
            }
        }
    }

    // Sentinels, non-finite numbers and custom values have no JSON form; they
    // all become `null`.
    impl From<&Value> for serde_json::Value {
        fn from(value: &Value) -> Self {
            match value {
                Value::Undefined | Value::Null | Value::Custom(_) => Self::Null,
                Value::Bool(b) => Self::Bool(*b),
                Value::Number(n) => number(*n),
                Value::String(s) => Self::String(s.clone()),
                Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
                Value::Object(map) => Self::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), Self::from(v)))
                        .collect(),
                ),
            }
        }
    }

    /// Integral numbers keep their integer JSON form.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn number(n: f64) -> serde_json::Value {
        if n.is_finite() && n.fract() == 0.0 {
            if n >= i64::MIN as f64 && n < i64::MAX as f64 {
                return serde_json::Value::Number((n as i64).into());
            }
            if n >= 0.0 && n < u64::MAX as f64 {
                return serde_json::Value::Number((n as u64).into());
            }
        }
        serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }

    impl serde::Serialize for Value {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serde_json::Value::from(self).serialize(serializer)
        }
    }

    impl<'de> serde::Deserialize<'de> for Value {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            serde_json::Value::deserialize(deserializer).map(Self::from)
        }
    }
}
