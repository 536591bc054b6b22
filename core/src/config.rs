//! Config types for declarative pattern and table construction.
//!
//! These types are serde-deserializable mirrors of the runtime types:
//!
//! | Config type | Runtime type | Loader method |
//! |-------------|-------------|---------------|
//! | [`PatternConfig`] | [`CompiledPattern`](crate::CompiledPattern) | `PatternConfig::compile()` |
//! | [`ArmConfig`] | [`Arm`](crate::Arm) | `ArmConfig::load()` |
//! | [`MatchTableConfig`] | [`MatchTable`](crate::MatchTable) | `MatchTableConfig::load()` |
//!
//! # Pattern syntax
//!
//! Scalars are literals, arrays are partial array shapes, objects are partial
//! object shapes. An object with a single `$`-prefixed key is a predicate
//! directive instead. A shape key that really starts with `$` is written with
//! a doubled `$$`, so `{ $$id: 7 }` matches objects whose `$id` is `7`.
//!
//! ```yaml
//! name: { first: { $type: string } }
//! age: { $gte: 18 }
//! tags: { $array_of: { $type: string } }
//! path: { $prefix: { value: /API/, ignore_case: true } }
//! nickname: { $union: [{ $type: nothing }, { $type: string }] }
//! ```

use crate::{
    compile, predicate, Arm, CompiledPattern, IntoCompiled, MatchTable, Pattern, PatternError,
    Predicate, TextMatcher, Value, MAX_ARMS,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::borrow::Cow;

/// Declarative pattern, as written in JSON or YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternConfig(pub Json);

impl PatternConfig {
    /// Translate into a [`Pattern`], resolving directives.
    ///
    /// # Errors
    ///
    /// [`PatternError::UnknownDirective`] or [`PatternError::InvalidDirective`]
    /// for a bad directive, or any compile error of a nested shape used as a
    /// predicate argument.
    pub fn to_pattern(&self) -> Result<Pattern, PatternError> {
        to_pattern(&self.0)
    }

    /// Translate and compile.
    ///
    /// # Errors
    ///
    /// Same as [`to_pattern`](Self::to_pattern), plus [`compile`] errors.
    pub fn compile(&self) -> Result<CompiledPattern, PatternError> {
        compile(&self.to_pattern()?)
    }
}

impl IntoCompiled for &PatternConfig {
    fn into_compiled(self) -> Result<CompiledPattern, PatternError> {
        self.compile()
    }
}

fn to_pattern(json: &Json) -> Result<Pattern, PatternError> {
    match json {
        Json::Array(items) => items
            .iter()
            .map(to_pattern)
            .collect::<Result<_, _>>()
            .map(Pattern::Array),
        Json::Object(map) => {
            if let Some(key) = map.keys().find(|k| is_directive(k)) {
                if map.len() != 1 {
                    return Err(invalid(key, "a directive object must have exactly one key"));
                }
                return directive(key, &map[key]).map(Pattern::Predicate);
            }
            map.iter()
                .map(|(k, v)| Ok((unescape(k).to_owned(), to_pattern(v)?)))
                .collect::<Result<Vec<_>, PatternError>>()
                .map(Pattern::Object)
        }
        scalar => Ok(Pattern::Literal(Value::from(scalar.clone()))),
    }
}

fn is_directive(key: &str) -> bool {
    key.starts_with('$') && !key.starts_with("$$")
}

/// `$$key` names the shape key `$key`.
fn unescape(key: &str) -> &str {
    key.strip_prefix('$')
        .filter(|rest| rest.starts_with('$'))
        .unwrap_or(key)
}

/// A directive argument that is itself a pattern, lowered to a predicate.
fn nested(json: &Json) -> Result<Predicate, PatternError> {
    match to_pattern(json)? {
        Pattern::Predicate(p) => Ok(p),
        Pattern::Literal(v) => Ok(predicate::literal(v)),
        shape => Ok(predicate::pattern(compile(&shape)?)),
    }
}

fn directive(name: &str, arg: &Json) -> Result<Predicate, PatternError> {
    match name {
        "$type" => match arg.as_str() {
            Some("string") => Ok(predicate::string()),
            Some("number") => Ok(predicate::number()),
            Some("boolean") => Ok(predicate::boolean()),
            Some("nothing") => Ok(predicate::nothing()),
            Some("unknown") => Ok(predicate::unknown()),
            _ => Err(invalid(
                name,
                "expected one of string, number, boolean, nothing, unknown",
            )),
        },
        "$literal" => Ok(predicate::literal(Value::from(arg.clone()))),
        "$array_of" => Ok(predicate::array_of(nested(arg)?)),
        "$record_of" => Ok(predicate::record_of(nested(arg)?)),
        "$union" => {
            let members = arg
                .as_array()
                .ok_or_else(|| invalid(name, "expected an array of patterns"))?;
            Ok(predicate::union(
                members.iter().map(nested).collect::<Result<Vec<_>, _>>()?,
            ))
        }
        "$lt" | "$gt" | "$lte" | "$gte" => {
            let bound = arg
                .as_f64()
                .ok_or_else(|| invalid(name, "expected a number"))?;
            Ok(match name {
                "$lt" => predicate::lt(bound),
                "$gt" => predicate::gt(bound),
                "$lte" => predicate::lte(bound),
                _ => predicate::gte(bound),
            })
        }
        "$exact" | "$prefix" | "$suffix" | "$contains" | "$regex" => {
            let (value, ignore_case) = text_arg(name, arg)?;
            let matcher = match name {
                "$exact" => TextMatcher::exact(value, ignore_case),
                "$prefix" => TextMatcher::prefix(value, ignore_case),
                "$suffix" => TextMatcher::suffix(value, ignore_case),
                "$contains" => TextMatcher::contains(value, ignore_case),
                _ if ignore_case => TextMatcher::regex_ignore_case(&value)?,
                _ => TextMatcher::regex(&value)?,
            };
            Ok(predicate::text(matcher))
        }
        _ => Err(PatternError::UnknownDirective {
            directive: name.to_string(),
        }),
    }
}

#[derive(Deserialize)]
struct TextArg {
    value: String,
    #[serde(default)]
    ignore_case: bool,
}

fn text_arg<'a>(name: &str, arg: &'a Json) -> Result<(Cow<'a, str>, bool), PatternError> {
    if let Some(s) = arg.as_str() {
        return Ok((s.into(), false));
    }
    TextArg::deserialize(arg)
        .map(|t| (t.value.into(), t.ignore_case))
        .map_err(|e| invalid(name, &format!("expected a string or {{value, ignore_case}}: {e}")))
}

fn invalid(directive: &str, reason: &str) -> PatternError {
    PatternError::InvalidDirective {
        directive: directive.to_string(),
        reason: reason.to_string(),
    }
}

/// Configuration for an [`Arm`].
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct ArmConfig<A> {
    /// The arm's pattern.
    pub pattern: PatternConfig,

    /// What the arm returns on a match.
    pub action: A,
}

impl<A: Clone + Send + Sync + 'static> ArmConfig<A> {
    /// Compile into a runtime [`Arm`].
    ///
    /// # Errors
    ///
    /// Any [`PatternError`] from the pattern.
    pub fn load(self) -> Result<Arm<A>, PatternError> {
        Ok(Arm::new(self.pattern.compile()?, self.action))
    }
}

/// Configuration for a [`MatchTable`].
///
/// ```
/// use pura::{MatchTableConfig, Value};
///
/// let config: MatchTableConfig<String> = serde_json::from_str(r#"{
///     "arms": [
///         { "pattern": { "kind": "dog" }, "action": "dog" },
///         { "pattern": { "name": { "$type": "string" } }, "action": "named" }
///     ],
///     "on_no_match": "other"
/// }"#).unwrap();
///
/// let table = config.load().unwrap();
/// let garfield = Value::object([("kind", "cat"), ("name", "garfield")]);
/// assert_eq!(table.evaluate(&garfield), Some("named".to_string()));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct MatchTableConfig<A> {
    /// Arms to evaluate in order (first-match-wins).
    pub arms: Vec<ArmConfig<A>>,

    /// Fallback when no arm matches.
    #[serde(default)]
    pub on_no_match: Option<A>,
}

impl<A: Clone + Send + Sync + 'static> MatchTableConfig<A> {
    /// Compile every arm and build the table.
    ///
    /// # Errors
    ///
    /// [`PatternError::TooManyArms`] past [`MAX_ARMS`] (checked before any
    /// pattern is compiled), or the first arm's [`PatternError`].
    pub fn load(self) -> Result<MatchTable<A>, PatternError> {
        if self.arms.len() > MAX_ARMS {
            return Err(PatternError::TooManyArms {
                count: self.arms.len(),
                max: MAX_ARMS,
            });
        }
        let arms = self
            .arms
            .into_iter()
            .map(ArmConfig::load)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(arms = arms.len(), "loaded match table");
        Ok(MatchTable::new(arms, self.on_no_match))
    }
}
