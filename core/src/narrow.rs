//! Typed narrowing
//!
//! A [`Typed<T>`] pairs a compiled pattern with a Rust type `T` that every
//! matching value converts into. Handlers registered through
//! [`Match::with_typed`](crate::Match::with_typed) receive the narrowed `T`
//! instead of a raw [`Value`].

use crate::{predicate, CompiledPattern, IntoCompiled, PatternError, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Conversion out of a dynamic [`Value`].
///
/// Returns `None` when the value does not have the expected form.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be narrowed from a `Value`",
    label = "no `FromValue` implementation",
    note = "implement `FromValue`, or wrap a serde type in `pura::Json<T>` with the `serde` feature"
)]
pub trait FromValue: Sized {
    /// Convert, or `None` if the value has the wrong form.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

/// `undefined` and `null` narrow to `()`.
impl FromValue for () {
    fn from_value(value: &Value) -> Option<Self> {
        value.is_nothing().then_some(())
    }
}

/// Nothing narrows to `None`; anything else must convert to `T`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        if value.is_nothing() {
            Some(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_value).collect()
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Option<Self> {
        value
            .as_object()?
            .iter()
            .map(|(k, v)| T::from_value(v).map(|t| (k.clone(), t)))
            .collect()
    }
}

/// A compiled pattern whose matches narrow to `T`.
///
/// # Example
///
/// ```
/// use pura::{narrow, Typed, Value};
///
/// let names = Typed::array_of(Typed::string()).unwrap();
/// let subject = Value::array(["odie", "garfield"]);
///
/// let narrowed: Option<Vec<String>> = narrow(&names, &subject);
/// assert_eq!(narrowed, Some(vec!["odie".to_string(), "garfield".to_string()]));
/// assert_eq!(narrow(&names, &Value::array([1, 2])), None);
/// ```
pub struct Typed<T> {
    pattern: CompiledPattern,
    _narrows_to: PhantomData<fn() -> T>,
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        Self::wrap(self.pattern.clone())
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typed")
            .field("narrows_to", &std::any::type_name::<T>())
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl<T> Typed<T> {
    fn wrap(pattern: CompiledPattern) -> Self {
        Self {
            pattern,
            _narrows_to: PhantomData,
        }
    }

    /// The underlying compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }
}

impl<T: FromValue> Typed<T> {
    /// Pair an arbitrary pattern with a target type.
    ///
    /// The caller is responsible for choosing a `T` the pattern's matches
    /// actually convert into; a value that passes the pattern but fails
    /// conversion is treated as not narrowing.
    ///
    /// # Errors
    ///
    /// Returns the [`PatternError`] if the pattern fails to compile.
    pub fn new(pattern: impl IntoCompiled) -> Result<Self, PatternError> {
        pattern.into_compiled().map(Self::wrap)
    }

    /// Match values strictly equal to `literal`, narrowing to its own type.
    ///
    /// ```
    /// use pura::{narrow, Typed, Value};
    ///
    /// let odie = Typed::<String>::literal("odie").unwrap();
    /// assert_eq!(narrow(&odie, &Value::from("odie")).as_deref(), Some("odie"));
    /// assert_eq!(narrow(&odie, &Value::from("garfield")), None);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::NanLiteral`] for a NaN number literal.
    pub fn literal(literal: impl Into<T>) -> Result<Self, PatternError>
    where
        T: Into<Value>,
    {
        let value: Value = literal.into().into();
        Self::new(predicate::literal(value))
    }

    /// Arrays whose every element matches, narrowed to `Vec<T>`.
    ///
    /// # Errors
    ///
    /// [`PatternError::DepthExceeded`] if wrapping pushes the pattern past
    /// [`MAX_DEPTH`](crate::MAX_DEPTH).
    pub fn array_of(element: Typed<T>) -> Result<Typed<Vec<T>>, PatternError> {
        Typed::new(predicate::array_of(predicate::pattern(element.pattern)))
    }

    /// Objects whose every value matches, narrowed to `BTreeMap<String, T>`.
    ///
    /// # Errors
    ///
    /// Same as [`array_of`](Self::array_of).
    pub fn record_of(value: Typed<T>) -> Result<Typed<BTreeMap<String, T>>, PatternError> {
        Typed::new(predicate::record_of(predicate::pattern(value.pattern)))
    }

    /// `undefined`, `null`, or a match of this pattern, narrowed to `Option<T>`.
    ///
    /// # Errors
    ///
    /// Same as [`array_of`](Self::array_of).
    pub fn optional(inner: Typed<T>) -> Result<Typed<Option<T>>, PatternError> {
        Typed::new(predicate::union([
            predicate::nothing(),
            predicate::pattern(inner.pattern),
        ]))
    }
}

impl Typed<String> {
    /// Any string.
    #[must_use]
    pub fn string() -> Self {
        Self::wrap(CompiledPattern::trusted(predicate::string()))
    }
}

impl Typed<f64> {
    /// Any number.
    #[must_use]
    pub fn number() -> Self {
        Self::wrap(CompiledPattern::trusted(predicate::number()))
    }
}

impl Typed<bool> {
    /// Any boolean.
    #[must_use]
    pub fn boolean() -> Self {
        Self::wrap(CompiledPattern::trusted(predicate::boolean()))
    }
}

impl Typed<()> {
    /// `undefined` or `null`.
    #[must_use]
    pub fn nothing() -> Self {
        Self::wrap(CompiledPattern::trusted(predicate::nothing()))
    }
}

impl Typed<Value> {
    /// Anything, passed through unchanged.
    #[must_use]
    pub fn unknown() -> Self {
        Self::wrap(CompiledPattern::trusted(predicate::unknown()))
    }
}

/// Test `subject` against `typed` and convert it on a match.
///
/// Returns `None` if the pattern does not match or the conversion fails.
pub fn narrow<T: FromValue>(typed: &Typed<T>, subject: &Value) -> Option<T> {
    if typed.pattern.test(subject) {
        T::from_value(subject)
    } else {
        None
    }
}

#[cfg(feature = "serde")]
mod json {
    use super::FromValue;
    use crate::Value;
    use serde::de::DeserializeOwned;

    /// Narrow into any deserializable type.
    ///
    /// # Example
    ///
    /// ```
    /// use pura::{narrow, object, predicate, Json, Typed, Value};
    /// use serde::Deserialize;
    ///
    /// #[derive(Debug, Deserialize, PartialEq)]
    /// struct Name {
    ///     first: String,
    /// }
    ///
    /// let named = Typed::<Json<Name>>::new(object([("first", predicate::string())])).unwrap();
    /// let subject = Value::object([("first", "jon"), ("last", "arbuckle")]);
    /// let Json(name) = narrow(&named, &subject).unwrap();
    /// assert_eq!(name, Name { first: "jon".into() });
    /// ```
    #[derive(Debug, Clone, PartialEq)]
    pub struct Json<T>(pub T);

    impl<T: DeserializeOwned> FromValue for Json<T> {
        fn from_value(value: &Value) -> Option<Self> {
            serde_json::from_value(serde_json::Value::from(value))
                .ok()
                .map(Json)
        }
    }
}

#[cfg(feature = "serde")]
pub use json::Json;
