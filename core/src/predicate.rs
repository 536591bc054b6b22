//! Predicate: self-describing runtime interfaces
//!
//! A [`Predicate`] is a test over one [`Value`] that also knows the type its
//! matches narrow to. Predicates are the leaf building blocks of patterns and
//! compose through [`array_of`], [`record_of`] and [`union`].
//!
//! The set of kinds is closed ([`PredicateKind`]); caller-defined tests enter
//! through [`PredicateKind::Custom`] by implementing [`RuntimeInterface`], and
//! compose exactly like the built-ins.

use crate::{TextMatcher, TypeTag, Value};
use std::fmt::{self, Debug};
use std::sync::Arc;

/// A caller-defined predicate.
///
/// Anything with a `test` can be used wherever a built-in predicate can.
///
/// # Example
///
/// ```
/// use pura::{predicate, RuntimeInterface, TypeTag, Value};
///
/// #[derive(Debug)]
/// struct Even;
///
/// impl RuntimeInterface for Even {
///     fn test(&self, value: &Value) -> bool {
///         value.as_f64().is_some_and(|n| n % 2.0 == 0.0)
///     }
///
///     fn narrowed_type(&self) -> TypeTag {
///         TypeTag::Number
///     }
/// }
///
/// let evens = predicate::array_of(predicate::custom(Even));
/// assert!(evens.test(&Value::array([2, 4, 6])));
/// assert!(!evens.test(&Value::array([2, 3])));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `RuntimeInterface`",
    label = "this type cannot be used as a predicate",
    note = "implement `test(&self, &Value) -> bool`, or wrap a closure with `predicate::custom_fn`"
)]
pub trait RuntimeInterface: Send + Sync + Debug {
    /// Check if the value satisfies this predicate.
    fn test(&self, value: &Value) -> bool;

    /// The type matching values are known to have. Default: `unknown`.
    fn narrowed_type(&self) -> TypeTag {
        TypeTag::Unknown
    }

    /// Nesting depth counted toward [`MAX_DEPTH`](crate::MAX_DEPTH). Default: 1.
    fn depth(&self) -> usize {
        1
    }
}

#[diagnostic::do_not_recommend]
impl RuntimeInterface for Box<dyn RuntimeInterface> {
    fn test(&self, value: &Value) -> bool {
        (**self).test(value)
    }

    fn narrowed_type(&self) -> TypeTag {
        (**self).narrowed_type()
    }

    fn depth(&self) -> usize {
        (**self).depth()
    }
}

/// Primitive types recognised by [`PredicateKind::TypeOf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
}

impl Primitive {
    fn check(self, value: &Value) -> bool {
        match self {
            Self::String => matches!(value, Value::String(_)),
            Self::Number => matches!(value, Value::Number(_)),
            Self::Boolean => matches!(value, Value::Bool(_)),
        }
    }

    fn tag(self) -> TypeTag {
        match self {
            Self::String => TypeTag::String,
            Self::Number => TypeTag::Number,
            Self::Boolean => TypeTag::Boolean,
        }
    }
}

/// Numeric comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Lte,
    Gte,
}

impl CompareOp {
    fn apply(self, n: f64, bound: f64) -> bool {
        match self {
            Self::Lt => n < bound,
            Self::Gt => n > bound,
            Self::Lte => n <= bound,
            Self::Gte => n >= bound,
        }
    }

    /// Operator symbol, e.g. `"<="`.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
        }
    }
}

/// The kind of test a [`Predicate`] performs.
#[derive(Clone)]
pub enum PredicateKind {
    /// Strict equality with a primitive value.
    Literal(Value),
    /// The value has this primitive type.
    TypeOf(Primitive),
    /// The value is `Undefined` or `Null`.
    Nothing,
    /// Always matches.
    Unknown,
    /// Array whose every element satisfies the inner predicate.
    ArrayOf(Box<Predicate>),
    /// Object whose every value satisfies the inner predicate.
    RecordOf(Box<Predicate>),
    /// Any member matches. An empty union matches nothing.
    Union(Vec<Predicate>),
    /// Number compared against a bound. Non-numbers never match.
    Comparison { op: CompareOp, bound: f64 },
    /// String test.
    Text(TextMatcher),
    /// Caller-defined test.
    Custom(Arc<dyn RuntimeInterface>),
}

impl Debug for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Self::TypeOf(p) => f.debug_tuple("TypeOf").field(p).finish(),
            Self::Nothing => f.write_str("Nothing"),
            Self::Unknown => f.write_str("Unknown"),
            Self::ArrayOf(p) => f.debug_tuple("ArrayOf").field(p).finish(),
            Self::RecordOf(p) => f.debug_tuple("RecordOf").field(p).finish(),
            Self::Union(ps) => f.debug_tuple("Union").field(ps).finish(),
            Self::Comparison { op, bound } => write!(f, "Comparison({} {bound})", op.symbol()),
            Self::Text(m) => f.debug_tuple("Text").field(m).finish(),
            Self::Custom(c) => f.debug_tuple("Custom").field(c).finish(),
        }
    }
}

/// A composable, self-describing test over one value.
///
/// Predicates are immutable; combinators wrap their children without
/// changing them.
#[derive(Debug, Clone)]
pub struct Predicate {
    kind: PredicateKind,
}

impl Predicate {
    /// Wrap a kind.
    #[must_use]
    pub fn new(kind: PredicateKind) -> Self {
        Self { kind }
    }

    /// The kind of test this predicate performs.
    #[must_use]
    pub fn kind(&self) -> &PredicateKind {
        &self.kind
    }

    /// Evaluate this predicate against a value.
    ///
    /// Deterministic and side-effect-free for the built-in kinds.
    pub fn test(&self, value: &Value) -> bool {
        match &self.kind {
            PredicateKind::Literal(expected) => value == expected,
            PredicateKind::TypeOf(p) => p.check(value),
            PredicateKind::Nothing => value.is_nothing(),
            PredicateKind::Unknown => true,
            PredicateKind::ArrayOf(p) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| p.test(item))),
            PredicateKind::RecordOf(p) => value
                .as_object()
                .is_some_and(|map| map.values().all(|v| p.test(v))),
            PredicateKind::Union(members) => members.iter().any(|p| p.test(value)),
            PredicateKind::Comparison { op, bound } => {
                value.as_f64().is_some_and(|n| op.apply(n, *bound))
            }
            PredicateKind::Text(m) => m.matches(value),
            PredicateKind::Custom(c) => c.test(value),
        }
    }

    /// The type a matching value narrows to.
    #[must_use]
    pub fn narrowed_type(&self) -> TypeTag {
        match &self.kind {
            PredicateKind::Literal(v) => TypeTag::literal(v),
            PredicateKind::TypeOf(p) => p.tag(),
            PredicateKind::Nothing => TypeTag::Nothing,
            PredicateKind::Unknown => TypeTag::Unknown,
            PredicateKind::ArrayOf(p) => TypeTag::Array(Box::new(p.narrowed_type())),
            PredicateKind::RecordOf(p) => TypeTag::Record(Box::new(p.narrowed_type())),
            PredicateKind::Union(ps) => {
                TypeTag::Union(ps.iter().map(Predicate::narrowed_type).collect())
            }
            PredicateKind::Comparison { .. } => TypeTag::Number,
            PredicateKind::Text(_) => TypeTag::String,
            PredicateKind::Custom(c) => c.narrowed_type(),
        }
    }

    /// Nesting depth of this predicate.
    #[must_use]
    pub fn depth(&self) -> usize {
        match &self.kind {
            PredicateKind::ArrayOf(p) | PredicateKind::RecordOf(p) => 1 + p.depth(),
            PredicateKind::Union(ps) => 1 + ps.iter().map(Predicate::depth).max().unwrap_or(0),
            PredicateKind::Custom(c) => c.depth(),
            _ => 1,
        }
    }

    /// Returns `true` if this is a `Custom` predicate.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self.kind, PredicateKind::Custom(_))
    }
}

impl From<PredicateKind> for Predicate {
    fn from(kind: PredicateKind) -> Self {
        Self::new(kind)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constructors
// ═══════════════════════════════════════════════════════════════════════════════

/// Matches any string.
#[must_use]
pub fn string() -> Predicate {
    Predicate::new(PredicateKind::TypeOf(Primitive::String))
}

/// Matches any number.
#[must_use]
pub fn number() -> Predicate {
    Predicate::new(PredicateKind::TypeOf(Primitive::Number))
}

/// Matches any boolean.
#[must_use]
pub fn boolean() -> Predicate {
    Predicate::new(PredicateKind::TypeOf(Primitive::Boolean))
}

/// Matches only `Undefined` and `Null`.
#[must_use]
pub fn nothing() -> Predicate {
    Predicate::new(PredicateKind::Nothing)
}

/// Matches everything.
#[must_use]
pub fn unknown() -> Predicate {
    Predicate::new(PredicateKind::Unknown)
}

/// Matches values strictly equal to `value`.
#[must_use]
pub fn literal(value: impl Into<Value>) -> Predicate {
    Predicate::new(PredicateKind::Literal(value.into()))
}

/// Matches arrays whose every element satisfies `element`.
#[must_use]
pub fn array_of(element: Predicate) -> Predicate {
    Predicate::new(PredicateKind::ArrayOf(Box::new(element)))
}

/// Matches objects whose every value satisfies `value` (keys unconstrained).
#[must_use]
pub fn record_of(value: Predicate) -> Predicate {
    Predicate::new(PredicateKind::RecordOf(Box::new(value)))
}

/// Matches if any member matches.
#[must_use]
pub fn union(members: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::new(PredicateKind::Union(members.into_iter().collect()))
}

/// Matches numbers `< bound`.
#[must_use]
pub fn lt(bound: f64) -> Predicate {
    Predicate::new(PredicateKind::Comparison {
        op: CompareOp::Lt,
        bound,
    })
}

/// Matches numbers `> bound`.
#[must_use]
pub fn gt(bound: f64) -> Predicate {
    Predicate::new(PredicateKind::Comparison {
        op: CompareOp::Gt,
        bound,
    })
}

/// Matches numbers `<= bound`.
#[must_use]
pub fn lte(bound: f64) -> Predicate {
    Predicate::new(PredicateKind::Comparison {
        op: CompareOp::Lte,
        bound,
    })
}

/// Matches numbers `>= bound`.
#[must_use]
pub fn gte(bound: f64) -> Predicate {
    Predicate::new(PredicateKind::Comparison {
        op: CompareOp::Gte,
        bound,
    })
}

/// Matches strings starting with `prefix`.
#[must_use]
pub fn prefix(prefix: impl Into<String>) -> Predicate {
    text(TextMatcher::prefix(prefix, false))
}

/// Matches strings ending with `suffix`.
#[must_use]
pub fn suffix(suffix: impl Into<String>) -> Predicate {
    text(TextMatcher::suffix(suffix, false))
}

/// Matches strings containing `needle`.
#[must_use]
pub fn contains(needle: impl Into<String>) -> Predicate {
    text(TextMatcher::contains(needle, false))
}

/// Matches strings against a regular expression.
///
/// # Errors
///
/// Returns a [`PatternError`](crate::PatternError) if the expression is
/// invalid or too long.
pub fn regex(pattern: &str) -> Result<Predicate, crate::PatternError> {
    TextMatcher::regex(pattern).map(text)
}

/// Wrap any [`TextMatcher`].
#[must_use]
pub fn text(matcher: TextMatcher) -> Predicate {
    Predicate::new(PredicateKind::Text(matcher))
}

/// Wrap a caller-defined [`RuntimeInterface`].
#[must_use]
pub fn custom(interface: impl RuntimeInterface + 'static) -> Predicate {
    Predicate::new(PredicateKind::Custom(Arc::new(interface)))
}

/// Use a compiled pattern (e.g. an object shape) as a predicate, so it can be
/// nested inside `array_of`, `record_of` or `union`.
#[must_use]
pub fn pattern(compiled: crate::CompiledPattern) -> Predicate {
    custom(compiled)
}

/// Wrap a closure as a custom predicate.
///
/// `name` appears in `Debug` output and as the narrowed type.
///
/// ```
/// use pura::{predicate, Value};
///
/// let non_empty = predicate::custom_fn("NonEmpty", |v| v.as_str().is_some_and(|s| !s.is_empty()));
/// assert!(non_empty.test(&Value::from("x")));
/// assert!(!non_empty.test(&Value::from("")));
/// assert_eq!(non_empty.narrowed_type().to_string(), "NonEmpty");
/// ```
#[must_use]
pub fn custom_fn<F>(name: impl Into<String>, test: F) -> Predicate
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    custom(FnInterface {
        name: name.into(),
        test: Box::new(test),
    })
}

struct FnInterface {
    name: String,
    test: Box<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Debug for FnInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnInterface").field(&self.name).finish()
    }
}

impl RuntimeInterface for FnInterface {
    fn test(&self, value: &Value) -> bool {
        (self.test)(value)
    }

    fn narrowed_type(&self) -> TypeTag {
        TypeTag::Custom(self.name.clone())
    }
}
