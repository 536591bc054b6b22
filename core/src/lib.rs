//! pura - structural pattern matching and guarded mutation cells
//!
//! Two small runtime primitives:
//!
//! - a **pattern-matching engine**: declare arms as partial object/array
//!   shapes, primitive literals, or predicates; evaluate them in order
//!   against one subject; the first match wins;
//! - a **mutation cell**: a value wrapped behind a read/write capability
//!   pair that enforces "no write in the constructing turn" and "at most one
//!   write per read handler" at runtime.
//!
//! # Architecture
//!
//! - [`Value`]: Erased subject type (primitives + arrays + objects + extensible Custom)
//! - [`Predicate`]: Self-describing test over one value, with a narrowed [`TypeTag`]
//! - [`Pattern`]: Literal, partial shape, or predicate
//! - [`CompiledPattern`]: Validated, reusable test tree ([`compile`])
//! - [`Match`]: Single-use first-match-wins chain over one subject
//! - [`MatchTable`]: Reusable arms → actions table
//! - [`Typed<T>`]: Pattern whose matches narrow to a static Rust type
//! - [`cell`] / [`Reader`] / [`Writer`]: Guarded mutation cell over a [`Scheduler`]
//!
//! # Example
//!
//! ```
//! use pura::prelude::*;
//!
//! let johnny = Value::object([(
//!     "name",
//!     Value::object([("first", "johnny"), ("last", "bravo")]),
//! )]);
//!
//! let greeting = match_value(&johnny)
//!     .with(object([("name", object([("first", predicate::string())]))]), |v| {
//!         let first = v.get("name").and_then(|n| n.get("first"));
//!         format!("hi {}", first.and_then(Value::as_str).unwrap_or_default())
//!     })
//!     .otherwise(|_| "who?".to_string())
//!     .unwrap();
//!
//! assert_eq!(greeting, "hi johnny");
//! ```
//!
//! # Extensions
//!
//! - [`PatternConfig`] / [`MatchTableConfig`]: declarative JSON/YAML patterns (feature = `"serde"`)
//! - [`pura-test`](https://docs.rs/pura-test): YAML conformance fixtures (internal)

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod cell;
mod compile;
mod matcher;
mod narrow;
mod pattern;
pub mod predicate;
mod scheduler;
mod table;
mod text_match;
mod trace;
mod type_tag;
mod value;

#[cfg(feature = "serde")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use compile::{compile, CompiledPattern, IntoCompiled};
pub use pattern::{array, object, Pattern};
pub use predicate::{CompareOp, Predicate, PredicateKind, Primitive, RuntimeInterface};
pub use text_match::TextMatcher;
pub use type_tag::TypeTag;
pub use value::{CustomValue, Value};

// Match engine
pub use matcher::{match_value, Match, Outcome};
pub use narrow::{narrow, FromValue, Typed};
pub use table::{Arm, MatchTable};

#[cfg(feature = "serde")]
pub use narrow::Json;

// Mutation cell
pub use cell::{cell, Reader, Snapshot, Writer};
pub use scheduler::{Scheduler, Task, Turn, TurnQueue};

// Config (feature-gated)
#[cfg(feature = "serde")]
pub use config::{ArmConfig, MatchTableConfig, PatternConfig};

// Trace types
pub use trace::{ArmStep, MatchTrace, PatternTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use pura::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core functions
        array,
        cell,
        compile,
        match_value,
        narrow,
        object,
        predicate,
        // Core types
        Arm,
        // Errors
        CellError,
        CompiledPattern,
        IntoCompiled,
        Match,
        MatchError,
        MatchTable,
        Outcome,
        Pattern,
        PatternError,
        Predicate,
        Reader,
        // Traits
        RuntimeInterface,
        Scheduler,
        Snapshot,
        Turn,
        TurnQueue,
        TypeTag,
        Typed,
        Value,
        Writer,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum nesting depth of a pattern (shapes and predicate combinators).
///
/// This limit protects against stack overflow from deeply nested patterns.
/// Enforced by [`compile`].
pub const MAX_DEPTH: usize = 32;

/// Maximum number of keys or indices in a single object or array shape.
///
/// Prevents width-based denial-of-service: a shape with millions of keys at
/// depth 1 bypasses [`MAX_DEPTH`] but still costs unbounded work per test.
pub const MAX_SHAPE_WIDTH: usize = 256;

/// Maximum number of members in a single `union` predicate.
pub const MAX_UNION_MEMBERS: usize = 256;

/// Maximum number of arms in a [`MatchTable`]. Enforced by
/// [`MatchTable::validate`] and config loading.
pub const MAX_ARMS: usize = 256;

/// Maximum length for regex patterns.
///
/// Regex compilation is expensive even with the linear-time Rust `regex`
/// crate.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

/// Default task budget for one [`TurnQueue::run_until_idle`] call.
pub const DEFAULT_MAX_TASKS_PER_FLUSH: usize = 1000;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from pattern construction and compilation.
///
/// These are caught when a pattern is compiled or a config is loaded, never
/// while matching. Fix the pattern and compile again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    /// A literal pattern was an array or object.
    #[error(
        "literal patterns must be primitive, got {type_name}; \
         use an object/array shape for structural matching"
    )]
    NonPrimitiveLiteral {
        /// Type of the offending literal.
        type_name: &'static str,
    },

    /// A literal was `NaN`, which never equals anything.
    #[error("NaN literal can never match; use predicate::number() instead")]
    NanLiteral,

    /// An object shape declared the same key twice.
    #[error("object shape declares key \"{key}\" more than once")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },

    /// Pattern nesting exceeds [`MAX_DEPTH`].
    #[error("pattern nesting depth is {depth}, but maximum allowed is {max}")]
    DepthExceeded {
        /// Depth reached.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// A shape exceeds [`MAX_SHAPE_WIDTH`].
    #[error("shape has {width} entries, but maximum allowed is {max}")]
    ShapeTooWide {
        /// Number of keys or indices.
        width: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A union exceeds [`MAX_UNION_MEMBERS`].
    #[error("union has {count} members, but maximum allowed is {max}")]
    TooManyUnionMembers {
        /// Number of members.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A comparison bound was `NaN`.
    #[error("comparison bound {bound} is not a number")]
    InvalidBound {
        /// The offending bound.
        bound: f64,
    },

    /// A regex failed to compile.
    #[error("invalid regex \"{pattern}\": {reason}")]
    InvalidRegex {
        /// The regex source.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },

    /// A regex exceeds [`MAX_REGEX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A config used a `$directive` that does not exist.
    #[error(
        "unknown directive \"{directive}\"; known: $type, $literal, $array_of, $record_of, \
         $union, $lt, $gt, $lte, $gte, $exact, $prefix, $suffix, $contains, $regex"
    )]
    UnknownDirective {
        /// The directive key.
        directive: String,
    },

    /// A config directive had a malformed argument.
    #[error("invalid {directive} directive: {reason}")]
    InvalidDirective {
        /// The directive key.
        directive: String,
        /// What was wrong.
        reason: String,
    },

    /// A table exceeds [`MAX_ARMS`].
    #[error("match table has {count} arms, but maximum allowed is {max}")]
    TooManyArms {
        /// Number of arms.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
}

/// Errors from [`Match::certain`].
///
/// "No arm matched" is only an error in certainty mode; [`Match::done`]
/// reports it as [`Outcome::Unmatched`] instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    /// An arm's pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// No arm matched and no fallback was given.
    #[error("no arm matched subject of type {subject_type} ({arms} arms tried)")]
    NoMatch {
        /// [`Value::type_name`] of the subject.
        subject_type: &'static str,
        /// Number of arms evaluated.
        arms: usize,
    },
}

/// Write-guard violations on a [`cell`].
///
/// These are programming mistakes, not data errors. Only the tolerant
/// `write_if_unwritten` variants swallow a duplicate write, and only because
/// the caller asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CellError {
    /// Write attempted in the turn that constructed the cell.
    #[error("write attempted in {turn}, the turn that constructed the cell; defer it to a later turn")]
    SynchronousWrite {
        /// The construction turn.
        turn: Turn,
    },

    /// A second write in one read handler (or one turn, for a standalone writer).
    #[error("cell already written in this handler (now at version {version})")]
    DuplicateWrite {
        /// Cell version after the write that did land.
        version: u64,
    },
}
