//! Pattern compiler: validate once, test many times
//!
//! [`compile`] turns a declared [`Pattern`] into a [`CompiledPattern`]: a
//! validated test tree plus the [`TypeTag`] its matches narrow to. All
//! structural problems surface here as a [`PatternError`], never at match time.

use crate::{
    PatternError, PatternTrace, Pattern, Predicate, PredicateKind, RuntimeInterface, TypeTag,
    Value, MAX_DEPTH, MAX_SHAPE_WIDTH, MAX_UNION_MEMBERS,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Stand-in for keys and indices the subject does not have.
static UNDEFINED: Value = Value::Undefined;

/// Validated test tree.
#[derive(Debug)]
enum Node {
    Literal(Value),
    Object(Vec<(String, Node)>),
    Array(Vec<Node>),
    Predicate(Predicate),
}

impl Node {
    fn test(&self, subject: &Value) -> bool {
        match self {
            Node::Literal(expected) => subject == expected,
            Node::Object(fields) => subject.as_object().is_some_and(|map| {
                fields
                    .iter()
                    .all(|(key, node)| node.test(map.get(key).unwrap_or(&UNDEFINED)))
            }),
            Node::Array(items) => subject.as_array().is_some_and(|values| {
                items
                    .iter()
                    .enumerate()
                    .all(|(i, node)| node.test(values.get(i).unwrap_or(&UNDEFINED)))
            }),
            Node::Predicate(p) => p.test(subject),
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Literal(_) => 1,
            Node::Object(fields) => 1 + fields.iter().map(|(_, n)| n.depth()).max().unwrap_or(0),
            Node::Array(items) => 1 + items.iter().map(Node::depth).max().unwrap_or(0),
            Node::Predicate(p) => p.depth(),
        }
    }

    fn trace(&self, subject: &Value) -> PatternTrace {
        match self {
            Node::Literal(expected) => PatternTrace::Literal {
                matched: subject == expected,
                expected: format!("{expected:?}"),
                actual: format!("{subject:?}"),
            },
            Node::Object(fields) => {
                let map = subject.as_object();
                let children: Vec<(String, PatternTrace)> = fields
                    .iter()
                    .map(|(key, node)| {
                        let value = map.and_then(|m| m.get(key)).unwrap_or(&UNDEFINED);
                        (key.clone(), node.trace(value))
                    })
                    .collect();
                let matched = map.is_some() && children.iter().all(|(_, t)| t.matched());
                PatternTrace::Object {
                    matched,
                    object_like: map.is_some(),
                    fields: children,
                }
            }
            Node::Array(items) => {
                let values = subject.as_array();
                let children: Vec<PatternTrace> = items
                    .iter()
                    .enumerate()
                    .map(|(i, node)| {
                        let value = values.and_then(|v| v.get(i)).unwrap_or(&UNDEFINED);
                        node.trace(value)
                    })
                    .collect();
                let matched = values.is_some() && children.iter().all(PatternTrace::matched);
                PatternTrace::Array {
                    matched,
                    array_like: values.is_some(),
                    items: children,
                }
            }
            Node::Predicate(p) => PatternTrace::Predicate {
                matched: p.test(subject),
                predicate: format!("{:?}", p.kind()),
                value: format!("{subject:?}"),
            },
        }
    }
}

/// A validated, reusable pattern.
///
/// Cloning is cheap (the test tree is shared).
#[derive(Clone)]
pub struct CompiledPattern {
    root: Arc<Node>,
    narrowed: Arc<TypeTag>,
    depth: usize,
}

impl CompiledPattern {
    /// Test a subject. Deterministic and side-effect-free.
    #[must_use]
    pub fn test(&self, subject: &Value) -> bool {
        self.root.test(subject)
    }

    /// Test with a full trace. Shapes evaluate every field (no short-circuit);
    /// `matched()` equals [`test`](Self::test).
    #[must_use]
    pub fn test_with_trace(&self, subject: &Value) -> PatternTrace {
        self.root.trace(subject)
    }

    /// The type a matching subject narrows to.
    #[must_use]
    pub fn narrowed_type(&self) -> &TypeTag {
        &self.narrowed
    }

    /// Nesting depth of the compiled tree, including nested compiled patterns.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl CompiledPattern {
    /// Wrap a predicate that is valid by construction (built-in constructors
    /// with finite bounds), skipping validation.
    pub(crate) fn trusted(predicate: Predicate) -> Self {
        let narrowed = predicate.narrowed_type();
        let depth = predicate.depth();
        Self {
            root: Arc::new(Node::Predicate(predicate)),
            narrowed: Arc::new(narrowed),
            depth,
        }
    }
}

// A compiled pattern is itself a runtime interface, so shapes compose into
// `array_of`, `record_of` and `union` like any other predicate.
impl RuntimeInterface for CompiledPattern {
    fn test(&self, value: &Value) -> bool {
        self.root.test(value)
    }

    fn narrowed_type(&self) -> TypeTag {
        self.narrowed.as_ref().clone()
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("narrowed", &self.narrowed.to_string())
            .finish()
    }
}

/// Compile a pattern.
///
/// # Errors
///
/// Returns a [`PatternError`] if the pattern is malformed: a non-primitive or
/// `NaN` literal, a duplicate object key, a `NaN` comparison bound, or a
/// shape that exceeds the depth/width limits.
///
/// # Example
///
/// ```
/// use pura::{compile, object, predicate, Value};
///
/// let pattern = compile(&object([("name", object([("first", predicate::string())]))])).unwrap();
///
/// let johnny = Value::object([(
///     "name",
///     Value::object([("first", "johnny"), ("last", "bravo")]),
/// )]);
/// assert!(pattern.test(&johnny));
///
/// let numbered = Value::object([("name", Value::object([("first", 42)]))]);
/// assert!(!pattern.test(&numbered));
/// ```
pub fn compile(pattern: &Pattern) -> Result<CompiledPattern, PatternError> {
    let (node, narrowed) = compile_node(pattern, 1)?;
    tracing::trace!(narrowed = %narrowed, "compiled pattern");
    let depth = node.depth();
    Ok(CompiledPattern {
        root: Arc::new(node),
        narrowed: Arc::new(narrowed),
        depth,
    })
}

fn check_depth(depth: usize) -> Result<(), PatternError> {
    if depth > MAX_DEPTH {
        return Err(PatternError::DepthExceeded {
            depth,
            max: MAX_DEPTH,
        });
    }
    Ok(())
}

fn check_width(width: usize) -> Result<(), PatternError> {
    if width > MAX_SHAPE_WIDTH {
        return Err(PatternError::ShapeTooWide {
            width,
            max: MAX_SHAPE_WIDTH,
        });
    }
    Ok(())
}

fn check_literal(value: &Value) -> Result<(), PatternError> {
    match value {
        Value::Array(_) | Value::Object(_) => Err(PatternError::NonPrimitiveLiteral {
            type_name: value.type_name(),
        }),
        Value::Number(n) if n.is_nan() => Err(PatternError::NanLiteral),
        _ => Ok(()),
    }
}

fn compile_node(pattern: &Pattern, depth: usize) -> Result<(Node, TypeTag), PatternError> {
    check_depth(depth)?;
    match pattern {
        Pattern::Literal(value) => {
            check_literal(value)?;
            Ok((Node::Literal(value.clone()), TypeTag::literal(value)))
        }
        Pattern::Object(entries) => {
            check_width(entries.len())?;
            let mut nodes = Vec::with_capacity(entries.len());
            let mut shape = BTreeMap::new();
            for (key, nested) in entries {
                let (node, tag) = compile_node(nested, depth + 1)?;
                if shape.insert(key.clone(), tag).is_some() {
                    return Err(PatternError::DuplicateKey { key: key.clone() });
                }
                nodes.push((key.clone(), node));
            }
            Ok((Node::Object(nodes), TypeTag::Shape(shape)))
        }
        Pattern::Array(items) => {
            check_width(items.len())?;
            let mut nodes = Vec::with_capacity(items.len());
            let mut tags = Vec::with_capacity(items.len());
            for nested in items {
                let (node, tag) = compile_node(nested, depth + 1)?;
                nodes.push(node);
                tags.push(tag);
            }
            Ok((Node::Array(nodes), TypeTag::Tuple(tags)))
        }
        Pattern::Predicate(p) => {
            validate_predicate(p, depth)?;
            Ok((Node::Predicate(p.clone()), p.narrowed_type()))
        }
    }
}

fn validate_predicate(predicate: &Predicate, depth: usize) -> Result<(), PatternError> {
    check_depth(depth)?;
    match predicate.kind() {
        PredicateKind::Literal(value) => check_literal(value),
        PredicateKind::Comparison { bound, .. } if bound.is_nan() => {
            Err(PatternError::InvalidBound { bound: *bound })
        }
        PredicateKind::ArrayOf(inner) | PredicateKind::RecordOf(inner) => {
            validate_predicate(inner, depth + 1)
        }
        PredicateKind::Union(members) => {
            if members.len() > MAX_UNION_MEMBERS {
                return Err(PatternError::TooManyUnionMembers {
                    count: members.len(),
                    max: MAX_UNION_MEMBERS,
                });
            }
            members
                .iter()
                .try_for_each(|member| validate_predicate(member, depth + 1))
        }
        // A nested compiled pattern brings its own depth.
        PredicateKind::Custom(c) => check_depth(depth + c.depth() - 1),
        _ => Ok(()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IntoCompiled
// ═══════════════════════════════════════════════════════════════════════════════

/// Anything a match arm accepts as its pattern.
///
/// Already-compiled patterns pass through; everything else is compiled on
/// the spot.
pub trait IntoCompiled {
    /// Produce a compiled pattern.
    ///
    /// # Errors
    ///
    /// Returns the [`PatternError`] from [`compile`].
    fn into_compiled(self) -> Result<CompiledPattern, PatternError>;
}

impl IntoCompiled for CompiledPattern {
    fn into_compiled(self) -> Result<CompiledPattern, PatternError> {
        Ok(self)
    }
}

impl IntoCompiled for &CompiledPattern {
    fn into_compiled(self) -> Result<CompiledPattern, PatternError> {
        Ok(self.clone())
    }
}

impl IntoCompiled for &Pattern {
    fn into_compiled(self) -> Result<CompiledPattern, PatternError> {
        compile(self)
    }
}

impl IntoCompiled for Pattern {
    fn into_compiled(self) -> Result<CompiledPattern, PatternError> {
        compile(&self)
    }
}

macro_rules! into_compiled_via_pattern {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoCompiled for $ty {
                fn into_compiled(self) -> Result<CompiledPattern, PatternError> {
                    compile(&Pattern::from(self))
                }
            }
        )*
    };
}

into_compiled_via_pattern!(Predicate, Value, &str, String, f64, i32, bool);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{array, object, predicate};

    fn johnny() -> Value {
        Value::object([(
            "name",
            Value::object([("first", "johnny"), ("last", "bravo")]),
        )])
    }

    #[test]
    fn test_literal_strict_equality() {
        let p = compile(&"odie".into()).unwrap();
        assert!(p.test(&"odie".into()));
        assert!(!p.test(&"Odie".into()));
        assert!(!p.test(&Value::Undefined));
        assert_eq!(p.narrowed_type().to_string(), "\"odie\"");
    }

    #[test]
    fn test_nested_object_shape() {
        let p = compile(&object([("name", object([("first", predicate::string())]))])).unwrap();
        assert!(p.test(&johnny()));
        assert!(!p.test(&Value::object([("name", Value::object([("first", 42)]))])));
        assert_eq!(p.narrowed_type().to_string(), "{ name: { first: string } }");
    }

    #[test]
    fn test_partial_object_ignores_extra_keys() {
        let p = compile(&object([("k", 1)])).unwrap();
        assert!(p.test(&Value::object([("k", 1), ("extra", 2), ("more", 3)])));
        assert!(!p.test(&Value::object([("other", 1)])));
    }

    #[test]
    fn test_object_shape_requires_object() {
        let p = compile(&object([("length", 1)])).unwrap();
        assert!(!p.test(&"x".into()));
        assert!(!p.test(&Value::array([1])));
        assert!(!p.test(&Value::Null));
        assert!(!p.test(&Value::Undefined));
    }

    #[test]
    fn test_empty_object_shape_matches_any_object() {
        let p = compile(&Pattern::Object(vec![])).unwrap();
        assert!(p.test(&Value::object([("a", 1)])));
        assert!(!p.test(&Value::Null));
    }

    #[test]
    fn test_missing_key_checked_as_undefined() {
        let p = compile(&object([("nickname", predicate::nothing())])).unwrap();
        assert!(p.test(&Value::object([("name", "odie")])));
        assert!(p.test(&Value::object([("nickname", Value::Null)])));
        assert!(!p.test(&Value::object([("nickname", "o")])));
    }

    #[test]
    fn test_partial_array_shape() {
        let p = compile(&array([Pattern::from(1), predicate::string().into()])).unwrap();
        assert!(p.test(&Value::array([Value::from(1), Value::from("a")])));
        assert!(p.test(&Value::array([
            Value::from(1),
            Value::from("a"),
            Value::from(true)
        ])));
        assert!(!p.test(&Value::array([1])));
        assert!(!p.test(&Value::object([("0", 1)])));
        assert_eq!(p.narrowed_type().to_string(), "[1, string, ...unknown[]]");
    }

    #[test]
    fn test_predicate_pattern_uses_predicate_type() {
        let p = compile(&predicate::union([predicate::string(), predicate::number()]).into())
            .unwrap();
        assert_eq!(*p.narrowed_type(), TypeTag::Union(vec![TypeTag::String, TypeTag::Number]));
        assert!(!p.test(&Value::from(true)));
    }

    #[test]
    fn test_shape_literals_never_match_absence() {
        let p = compile(&Pattern::from(Value::Null)).unwrap();
        assert!(p.test(&Value::Null));
        assert!(!p.test(&Value::Undefined));
    }

    #[test]
    fn test_non_primitive_literal_rejected() {
        let err = compile(&Pattern::Literal(Value::array([1]))).unwrap_err();
        assert_eq!(err, PatternError::NonPrimitiveLiteral { type_name: "array" });

        let err = compile(&predicate::literal(Value::object([("a", 1)])).into()).unwrap_err();
        assert!(matches!(err, PatternError::NonPrimitiveLiteral { .. }));
    }

    #[test]
    fn test_nan_rejected() {
        assert_eq!(
            compile(&Pattern::from(f64::NAN)).unwrap_err(),
            PatternError::NanLiteral
        );
        assert!(matches!(
            compile(&predicate::lt(f64::NAN).into()),
            Err(PatternError::InvalidBound { .. })
        ));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = compile(&Pattern::Object(vec![
            ("a".into(), 1.into()),
            ("a".into(), 2.into()),
        ]))
        .unwrap_err();
        assert_eq!(err, PatternError::DuplicateKey { key: "a".into() });
    }

    #[test]
    fn test_depth_limit() {
        let mut pattern = Pattern::from(1);
        for _ in 0..MAX_DEPTH {
            pattern = object([("next", pattern)]);
        }
        assert!(matches!(
            compile(&pattern),
            Err(PatternError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_depth_limit_counts_predicates() {
        let mut p = predicate::number();
        for _ in 0..MAX_DEPTH {
            p = predicate::array_of(p);
        }
        assert!(matches!(
            compile(&p.into()),
            Err(PatternError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_depth_limit_counts_nested_compiled_patterns() {
        let mut inner = compile(&Pattern::from(1)).unwrap();
        for _ in 1..MAX_DEPTH {
            inner = compile(&object([("next", predicate::pattern(inner))])).unwrap();
        }
        assert_eq!(inner.depth(), MAX_DEPTH);
        assert_eq!(
            compile(&object([("next", predicate::pattern(inner))])).unwrap_err(),
            PatternError::DepthExceeded {
                depth: MAX_DEPTH + 1,
                max: MAX_DEPTH
            }
        );
    }

    #[test]
    fn test_width_limit() {
        let wide = Pattern::Array((0..=MAX_SHAPE_WIDTH).map(|_| Pattern::from(1)).collect());
        assert!(matches!(
            compile(&wide),
            Err(PatternError::ShapeTooWide { .. })
        ));
    }

    #[test]
    fn test_compiling_twice_is_equivalent() {
        let pattern = object([("age", predicate::gte(18.0))]);
        let a = compile(&pattern).unwrap();
        let b = compile(&pattern).unwrap();
        for subject in [
            Value::object([("age", 18)]),
            Value::object([("age", 17)]),
            Value::Null,
        ] {
            assert_eq!(a.test(&subject), b.test(&subject));
        }
    }

    #[test]
    fn test_trace_matches_test() {
        let p = compile(&object([
            ("name", Pattern::from(predicate::string())),
            ("age", Pattern::from(predicate::gt(100.0))),
        ]))
        .unwrap();
        let subject = Value::object([("name", Value::from("odie")), ("age", Value::from(3))]);
        let trace = p.test_with_trace(&subject);
        assert_eq!(trace.matched(), p.test(&subject));

        let PatternTrace::Object { fields, .. } = trace else {
            panic!("expected object trace");
        };
        // No short-circuit: both fields were evaluated.
        assert_eq!(fields.len(), 2);
        assert!(fields.iter().any(|(k, t)| k == "name" && t.matched()));
        assert!(fields.iter().any(|(k, t)| k == "age" && !t.matched()));
    }

    #[test]
    fn test_into_compiled_variants() {
        let compiled = compile(&"x".into()).unwrap();
        assert!((&compiled).into_compiled().unwrap().test(&"x".into()));
        assert!("x".into_compiled().unwrap().test(&"x".into()));
        assert!(3_i32.into_compiled().unwrap().test(&Value::from(3)));
        assert!(true.into_compiled().unwrap().test(&Value::from(true)));
        assert!(predicate::string().into_compiled().unwrap().test(&"y".into()));
    }

    #[test]
    fn test_compiled_shape_composes_as_predicate() {
        let dog = compile(&object([("kind", "dog")])).unwrap();
        let pack = compile(&predicate::array_of(predicate::pattern(dog)).into()).unwrap();
        assert!(pack.test(&Value::array([
            Value::object([("kind", "dog"), ("name", "odie")]),
            Value::object([("kind", "dog")]),
        ])));
        assert!(!pack.test(&Value::array([Value::object([("kind", "cat")])])));
        assert_eq!(pack.narrowed_type().to_string(), "{ kind: \"dog\" }[]");
    }

    #[test]
    fn test_compiled_pattern_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledPattern>();
    }
}
