//! Scheduler: the deferred-execution collaborator
//!
//! A [`Cell`](crate::cell) only needs two things from its host: a way to
//! defer a callback past the current synchronous span, and a way to tell
//! which span ("turn") is running now. [`Scheduler`] is that seam.
//! [`TurnQueue`] is a deterministic single-threaded implementation.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use crate::DEFAULT_MAX_TASKS_PER_FLUSH;

/// One synchronous span of execution, numbered by the scheduler.
///
/// Turns only ever increase. Two observations in the same turn are
/// guaranteed to be within one uninterrupted synchronous extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Turn(pub u64);

impl Turn {
    /// The turn that follows this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn {}", self.0)
    }
}

/// A deferred task.
pub type Task = Box<dyn FnOnce()>;

/// Host capability: defer a callback and report the current turn.
///
/// `schedule` must never run the task before the current turn ends, and
/// every task must run in a turn later than the one that scheduled it.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Scheduler`",
    note = "implement `current_turn` and `schedule`, or use `pura::TurnQueue`"
)]
pub trait Scheduler {
    /// The turn currently executing.
    fn current_turn(&self) -> Turn;

    /// Run `task` in some later turn. Tasks run in scheduling order.
    fn schedule(&self, task: Task);
}

/// Deterministic FIFO scheduler.
///
/// Each task runs in a fresh turn: the counter advances right before the
/// task is invoked. Nothing runs until the owner drives the queue with
/// [`run_next`](Self::run_next) or [`run_until_idle`](Self::run_until_idle).
///
/// # Example
///
/// ```
/// use pura::{Scheduler, Turn, TurnQueue};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let queue = Rc::new(TurnQueue::new());
/// let seen = Rc::new(Cell::new(Turn(0)));
///
/// let (q, s) = (Rc::clone(&queue), Rc::clone(&seen));
/// queue.schedule(Box::new(move || s.set(q.current_turn())));
///
/// assert_eq!(queue.current_turn(), Turn(0));
/// assert_eq!(queue.run_until_idle(), 1);
/// assert_eq!(seen.get(), Turn(1));
/// ```
pub struct TurnQueue {
    tasks: RefCell<VecDeque<Task>>,
    turn: Cell<Turn>,
    /// Maximum tasks per `run_until_idle` call, to stop runaway rescheduling.
    pub max_tasks_per_flush: usize,
}

impl TurnQueue {
    /// Create an empty queue at turn 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: RefCell::new(VecDeque::new()),
            turn: Cell::new(Turn::default()),
            max_tasks_per_flush: DEFAULT_MAX_TASKS_PER_FLUSH,
        }
    }

    /// Set the per-flush task limit.
    #[must_use]
    pub fn with_max_tasks_per_flush(mut self, max: usize) -> Self {
        self.max_tasks_per_flush = max;
        self
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Returns `true` if no tasks are waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run the oldest pending task in a new turn.
    ///
    /// Returns `false` if the queue was empty.
    pub fn run_next(&self) -> bool {
        // Pop in its own statement so the task may schedule more work.
        let task = self.tasks.borrow_mut().pop_front();
        let Some(task) = task else {
            return false;
        };
        let turn = self.turn.get().next();
        self.turn.set(turn);
        tracing::trace!(%turn, "running task");
        task();
        true
    }

    /// Run tasks until the queue is empty or `max_tasks_per_flush` tasks
    /// have run. Tasks scheduled along the way are included.
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while ran < self.max_tasks_per_flush && self.run_next() {
            ran += 1;
        }
        if !self.is_idle() {
            tracing::warn!(
                ran,
                pending = self.pending(),
                max = self.max_tasks_per_flush,
                "flush limit reached with tasks still pending"
            );
        }
        ran
    }
}

impl Default for TurnQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TurnQueue {
    fn current_turn(&self) -> Turn {
        self.turn.get()
    }

    fn schedule(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for TurnQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnQueue")
            .field("turn", &self.turn.get())
            .field("pending", &self.pending())
            .field("max_tasks_per_flush", &self.max_tasks_per_flush)
            .finish()
    }
}
