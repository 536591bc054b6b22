//! Match: first-match-wins dispatch over one subject
//!
//! Build a chain with [`match_value`], add arms with [`Match::with`] or
//! [`Match::with_typed`], and finish with one of three terminals:
//!
//! | Terminal                         | No arm matched                        |
//! |----------------------------------|---------------------------------------|
//! | [`done`](Match::done)            | [`Outcome::Unmatched`] (the subject)  |
//! | [`otherwise`](Match::otherwise)  | the fallback handler's result         |
//! | [`certain`](Match::certain)      | [`MatchError::NoMatch`]               |
//!
//! Arms are evaluated in registration order and at most one handler runs.
//! If any arm's pattern fails to compile, the terminal returns that error
//! and no handler runs at all.

use crate::{narrow, CompiledPattern, FromValue, IntoCompiled, MatchError, PatternError, Typed, Value};

type Handler<'a, R> = Box<dyn FnOnce(&Value) -> Option<R> + 'a>;

struct Arm<'a, R> {
    pattern: CompiledPattern,
    fire: Handler<'a, R>,
}

/// Result of [`Match::done`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<'a, R> {
    /// An arm matched and its handler returned this.
    Handled(R),
    /// No arm matched; the subject is handed back unchanged.
    Unmatched(&'a Value),
}

impl<'a, R> Outcome<'a, R> {
    /// Returns `true` if an arm fired.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// The handler result, if an arm fired.
    pub fn handled(self) -> Option<R> {
        match self {
            Self::Handled(r) => Some(r),
            Self::Unmatched(_) => None,
        }
    }

    /// Collapse to a [`Value`]: the handler result, or the original subject.
    ///
    /// ```
    /// use pura::{match_value, predicate, Value};
    ///
    /// let subject = Value::from("garfield");
    /// let out = match_value(&subject)
    ///     .with(predicate::number(), |_| Value::from("a number"))
    ///     .done()
    ///     .unwrap()
    ///     .into_value();
    /// assert_eq!(out, subject);
    /// ```
    pub fn into_value(self) -> Value
    where
        R: Into<Value>,
    {
        match self {
            Self::Handled(r) => r.into(),
            Self::Unmatched(subject) => subject.clone(),
        }
    }
}

/// A pattern-match expression over one subject.
///
/// # Example
///
/// ```
/// use pura::{match_value, object, predicate, Value};
///
/// let garfield = Value::object([("kind", "cat"), ("name", "garfield")]);
///
/// let greeting = match_value(&garfield)
///     .with(object([("kind", "dog")]), |_| "woof".to_string())
///     .with(object([("name", predicate::string())]), |v| {
///         format!("hello {}", v.get("name").and_then(Value::as_str).unwrap_or_default())
///     })
///     .certain()
///     .unwrap();
///
/// assert_eq!(greeting, "hello garfield");
/// ```
#[must_use = "a match does nothing until a terminal (done, otherwise, certain) is called"]
pub struct Match<'a, R> {
    subject: &'a Value,
    arms: Vec<Arm<'a, R>>,
    error: Option<PatternError>,
}

/// Start a match expression over `subject`.
pub fn match_value<R>(subject: &Value) -> Match<'_, R> {
    Match::new(subject)
}

impl<'a, R> Match<'a, R> {
    /// Start a match expression over `subject`.
    pub fn new(subject: &'a Value) -> Self {
        Self {
            subject,
            arms: Vec::new(),
            error: None,
        }
    }

    /// Add an arm whose handler receives the matched subject.
    pub fn with<F>(self, pattern: impl IntoCompiled, handler: F) -> Self
    where
        F: FnOnce(&Value) -> R + 'a,
    {
        self.push(pattern.into_compiled(), Box::new(move |v| Some(handler(v))))
    }

    /// Add an arm whose handler receives the subject narrowed to `T`.
    ///
    /// ```
    /// use pura::{match_value, Typed, Value};
    ///
    /// let subject = Value::array([1, 2, 3]);
    /// let total = match_value(&subject)
    ///     .with_typed(&Typed::array_of(Typed::number()).unwrap(), |ns| ns.iter().sum::<f64>())
    ///     .otherwise(|_| 0.0)
    ///     .unwrap();
    /// assert_eq!(total, 6.0);
    /// ```
    pub fn with_typed<T, F>(self, typed: &Typed<T>, handler: F) -> Self
    where
        T: FromValue + 'a,
        F: FnOnce(T) -> R + 'a,
    {
        let checked = typed.clone();
        self.push(
            Ok(typed.pattern().clone()),
            Box::new(move |v| narrow(&checked, v).map(handler)),
        )
    }

    fn push(
        mut self,
        pattern: Result<CompiledPattern, PatternError>,
        fire: Handler<'a, R>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        match pattern {
            Ok(pattern) => self.arms.push(Arm { pattern, fire }),
            Err(e) => {
                tracing::debug!(arm = self.arms.len(), error = %e, "arm failed to compile");
                self.error = Some(e);
            }
        }
        self
    }

    /// Number of arms registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// Returns `true` if no arms have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    fn run(self) -> Result<Option<R>, PatternError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let subject = self.subject;
        for (index, arm) in self.arms.into_iter().enumerate() {
            if !arm.pattern.test(subject) {
                continue;
            }
            if let Some(result) = (arm.fire)(subject) {
                tracing::debug!(arm = index, narrowed = %arm.pattern.narrowed_type(), "arm matched");
                return Ok(Some(result));
            }
            tracing::debug!(arm = index, "arm matched but value did not narrow");
        }
        tracing::debug!(subject_type = subject.type_name(), "no arm matched");
        Ok(None)
    }

    /// Finish, handing back the subject if no arm matched.
    ///
    /// # Errors
    ///
    /// Returns the first [`PatternError`] raised while adding arms.
    pub fn done(self) -> Result<Outcome<'a, R>, PatternError> {
        let subject = self.subject;
        Ok(match self.run()? {
            Some(r) => Outcome::Handled(r),
            None => Outcome::Unmatched(subject),
        })
    }

    /// Finish, calling `fallback` with the subject if no arm matched.
    ///
    /// # Errors
    ///
    /// Returns the first [`PatternError`] raised while adding arms.
    pub fn otherwise<F>(self, fallback: F) -> Result<R, PatternError>
    where
        F: FnOnce(&Value) -> R,
    {
        let subject = self.subject;
        Ok(match self.run()? {
            Some(r) => r,
            None => fallback(subject),
        })
    }

    /// Finish, treating "no arm matched" as an error.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Pattern`] for a compile failure, or
    /// [`MatchError::NoMatch`] if no arm matched.
    pub fn certain(self) -> Result<R, MatchError> {
        let subject = self.subject;
        let arms = self.arms.len();
        self.run()?.ok_or_else(|| MatchError::NoMatch {
            subject_type: subject.type_name(),
            arms,
        })
    }
}
