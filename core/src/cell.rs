//! Guarded mutation cell
//!
//! [`cell`] wraps one value and hands back exactly two capabilities: a
//! [`Reader`] and a [`Writer`]. Every observer gets an immutable snapshot;
//! the slot itself is never exposed by reference.
//!
//! Two guards are enforced at runtime:
//!
//! 1. **No synchronous write.** A write in the same [`Turn`] that built the
//!    cell fails with [`CellError::SynchronousWrite`].
//! 2. **At most one write per handler.** Inside one outermost
//!    [`Reader::read`] call only the first write lands, and across all
//!    reads and writers at most one write lands per turn. The strict variant fails with
//!    [`CellError::DuplicateWrite`]; the tolerant `write_if_unwritten`
//!    variant returns `Ok(false)` instead.
//!
//! # Example
//!
//! ```
//! use pura::{cell, TurnQueue};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let queue = Rc::new(TurnQueue::new());
//! let (reader, _writer) = cell(100, &queue);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let log = Rc::clone(&seen);
//! reader.read_later(move |s| {
//!     log.borrow_mut().push(*s.value());
//!     s.write(|n| n + 1).unwrap();
//! });
//! let log = Rc::clone(&seen);
//! reader.read_later(move |s| log.borrow_mut().push(*s.value()));
//!
//! queue.run_until_idle();
//! assert_eq!(*seen.borrow(), vec![100, 101]);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{CellError, Scheduler, Turn};

/// The outermost active read: what every nested read observes.
struct Frame<A> {
    version: u64,
    value: Rc<A>,
    previous: Option<Rc<A>>,
    depth: usize,
}

struct State<A> {
    version: u64,
    slot: Rc<A>,
    previous: Option<Rc<A>>,
    frame: Option<Frame<A>>,
    last_write_turn: Option<Turn>,
}

struct Shared<A> {
    state: RefCell<State<A>>,
    scheduler: Rc<dyn Scheduler>,
    created: Turn,
}

/// Which Guard 2 check a write is subject to.
#[derive(Clone, Copy)]
enum Scope {
    /// Inside a read handler that started at this version.
    Handler(u64),
    /// A standalone writer.
    Turn,
}

#[derive(Clone, Copy, PartialEq)]
enum Variant {
    Strict,
    Tolerant,
}

impl<A> Shared<A> {
    /// Outcome: `Ok(true)` applied, `Ok(false)` dropped by the tolerant variant.
    fn write<F>(&self, scope: Scope, variant: Variant, updater: F) -> Result<bool, CellError>
    where
        F: FnOnce(&A) -> A,
    {
        let turn = self.scheduler.current_turn();
        if turn == self.created {
            tracing::debug!(%turn, "write rejected: construction turn");
            return Err(CellError::SynchronousWrite { turn });
        }

        let current = {
            let state = self.state.borrow();
            if Self::already_written(&state, scope, turn) {
                return Self::duplicate(state.version, variant);
            }
            Rc::clone(&state.slot)
        };

        // The updater runs with no borrow held; a re-entrant write from it
        // bumps the version and makes this commit a duplicate.
        let next = updater(&current);

        let mut state = self.state.borrow_mut();
        if Self::already_written(&state, scope, turn) {
            return Self::duplicate(state.version, variant);
        }
        let replaced = std::mem::replace(&mut state.slot, Rc::new(next));
        state.previous = Some(replaced);
        state.version += 1;
        state.last_write_turn = Some(turn);
        tracing::debug!(%turn, version = state.version, "write applied");
        Ok(true)
    }

    fn already_written(state: &State<A>, scope: Scope, turn: Turn) -> bool {
        if state.last_write_turn == Some(turn) {
            return true;
        }
        match scope {
            Scope::Handler(version) => state.version != version,
            Scope::Turn => state
                .frame
                .as_ref()
                .is_some_and(|frame| state.version != frame.version),
        }
    }

    fn duplicate(version: u64, variant: Variant) -> Result<bool, CellError> {
        match variant {
            Variant::Strict => {
                tracing::debug!(version, "write rejected: already written");
                Err(CellError::DuplicateWrite { version })
            }
            Variant::Tolerant => {
                tracing::debug!(version, "write dropped: already written");
                Ok(false)
            }
        }
    }
}

/// Create a cell holding `initial`.
///
/// The current turn of `scheduler` is recorded as the construction turn;
/// no write can land until the scheduler has moved past it.
pub fn cell<A, S>(initial: A, scheduler: &Rc<S>) -> (Reader<A>, Writer<A>)
where
    S: Scheduler + 'static,
{
    let scheduler: Rc<dyn Scheduler> = Rc::clone(scheduler) as Rc<dyn Scheduler>;
    let created = scheduler.current_turn();
    let shared = Rc::new(Shared {
        state: RefCell::new(State {
            version: 0,
            slot: Rc::new(initial),
            previous: None,
            frame: None,
            last_write_turn: None,
        }),
        scheduler,
        created,
    });
    tracing::debug!(turn = %created, "cell created");
    (
        Reader {
            shared: Rc::clone(&shared),
        },
        Writer { shared },
    )
}

/// Read capability.
pub struct Reader<A> {
    shared: Rc<Shared<A>>,
}

impl<A> Clone for Reader<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<A> Reader<A> {
    /// Run `handler` against a snapshot of the current value.
    ///
    /// Reads nested inside `handler` observe the same snapshot, even after
    /// a write; a fresh value is only visible to a later outermost read.
    pub fn read<R, F>(&self, handler: F) -> R
    where
        F: FnOnce(&Snapshot<A>) -> R,
    {
        let snapshot = {
            let mut state = self.shared.state.borrow_mut();
            let fresh = Frame {
                version: state.version,
                value: Rc::clone(&state.slot),
                previous: state.previous.clone(),
                depth: 0,
            };
            let frame = state.frame.get_or_insert(fresh);
            frame.depth += 1;
            Snapshot {
                shared: Rc::clone(&self.shared),
                value: Rc::clone(&frame.value),
                previous: frame.previous.clone(),
                version: frame.version,
            }
        };
        let _frame = FrameGuard {
            shared: &self.shared,
        };
        handler(&snapshot)
    }

    /// Schedule a read for a later turn.
    ///
    /// Pending reads run in the order they were scheduled.
    pub fn read_later<F>(&self, handler: F)
    where
        A: 'static,
        F: FnOnce(&Snapshot<A>) + 'static,
    {
        let reader = self.clone();
        self.shared
            .scheduler
            .schedule(Box::new(move || reader.read(handler)));
    }

    /// Number of writes applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.state.borrow().version
    }
}

impl<A> fmt::Debug for Reader<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

/// Pops the active frame when the outermost read returns or unwinds.
struct FrameGuard<'a, A> {
    shared: &'a Shared<A>,
}

impl<A> Drop for FrameGuard<'_, A> {
    fn drop(&mut self) {
        let mut state = self.shared.state.borrow_mut();
        let done = state.frame.as_mut().is_some_and(|frame| {
            frame.depth -= 1;
            frame.depth == 0
        });
        if done {
            state.frame = None;
        }
    }
}

/// What one read handler sees, plus its write capability.
pub struct Snapshot<A> {
    shared: Rc<Shared<A>>,
    value: Rc<A>,
    previous: Option<Rc<A>>,
    version: u64,
}

impl<A> Snapshot<A> {
    /// The value at the start of the outermost read.
    #[must_use]
    pub fn value(&self) -> &A {
        &self.value
    }

    /// The value replaced by the most recent write before this read.
    #[must_use]
    pub fn previous(&self) -> Option<&A> {
        self.previous.as_deref()
    }

    /// The version this snapshot was taken at.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the value with `updater(current)`.
    ///
    /// # Errors
    ///
    /// [`CellError::SynchronousWrite`] in the construction turn;
    /// [`CellError::DuplicateWrite`] if this handler already wrote.
    pub fn write<F>(&self, updater: F) -> Result<(), CellError>
    where
        F: FnOnce(&A) -> A,
    {
        self.shared
            .write(Scope::Handler(self.version), Variant::Strict, updater)
            .map(|_| ())
    }

    /// Like [`write`](Self::write), but returns `Ok(false)` instead of
    /// failing when this handler already wrote.
    ///
    /// # Errors
    ///
    /// [`CellError::SynchronousWrite`] in the construction turn.
    pub fn write_if_unwritten<F>(&self, updater: F) -> Result<bool, CellError>
    where
        F: FnOnce(&A) -> A,
    {
        self.shared
            .write(Scope::Handler(self.version), Variant::Tolerant, updater)
    }
}

impl<A: fmt::Debug> fmt::Debug for Snapshot<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("value", &self.value)
            .field("previous", &self.previous)
            .field("version", &self.version)
            .finish()
    }
}

/// Standalone write capability.
pub struct Writer<A> {
    shared: Rc<Shared<A>>,
}

impl<A> Clone for Writer<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<A> Writer<A> {
    /// Replace the value with `updater(current)`.
    ///
    /// Inside an active read this shares that read's one-write budget;
    /// otherwise one write lands per turn.
    ///
    /// # Errors
    ///
    /// [`CellError::SynchronousWrite`] in the construction turn;
    /// [`CellError::DuplicateWrite`] if the budget is spent.
    pub fn write<F>(&self, updater: F) -> Result<(), CellError>
    where
        F: FnOnce(&A) -> A,
    {
        self.shared
            .write(Scope::Turn, Variant::Strict, updater)
            .map(|_| ())
    }

    /// Tolerant variant of [`write`](Self::write).
    ///
    /// # Errors
    ///
    /// [`CellError::SynchronousWrite`] in the construction turn.
    pub fn write_if_unwritten<F>(&self, updater: F) -> Result<bool, CellError>
    where
        F: FnOnce(&A) -> A,
    {
        self.shared.write(Scope::Turn, Variant::Tolerant, updater)
    }
}

impl<A> fmt::Debug for Writer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer").finish_non_exhaustive()
    }
}
