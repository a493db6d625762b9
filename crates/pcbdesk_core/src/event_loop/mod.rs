//! Single-threaded cooperative event loop.
//!
//! # Responsibility
//! - Defer work to a later turn (`post`) or a later time (`single_shot`).
//! - Run deferred work on the thread that owns the loop, never inline.
//!
//! # Invariants
//! - A task posted during a turn runs on the next turn, not the current one.
//! - Due timers run before queued tasks, ordered by deadline then by
//!   registration order.
//! - Pending work cannot be cancelled; callbacks that outlive their owner
//!   must check the owner themselves (usually through a `Weak`).

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use log::trace;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Upper bound of turns for [`EventLoop::run_until_idle`], so a task that
/// keeps re-posting itself cannot hang the caller.
const MAX_IDLE_TURNS: usize = 10_000;

/// Deadline used for delays too large to represent as an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

type Task = Box<dyn FnOnce()>;

/// Identifies one scheduled one-shot timer in logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

struct PendingTimer {
    id: TimerId,
    deadline: Instant,
    task: Task,
}

struct LoopState {
    clock: Rc<dyn Clock>,
    queue: RefCell<VecDeque<Task>>,
    timers: RefCell<Vec<PendingTimer>>,
    next_timer_id: Cell<u64>,
}

/// Cloneable handle to one event loop. Clones share the same queues.
#[derive(Clone)]
pub struct EventLoop {
    state: Rc<LoopState>,
}

impl EventLoop {
    /// Creates a loop driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock))
    }

    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            state: Rc::new(LoopState {
                clock,
                queue: RefCell::new(VecDeque::new()),
                timers: RefCell::new(Vec::new()),
                next_timer_id: Cell::new(1),
            }),
        }
    }

    pub fn now(&self) -> Instant {
        self.state.clock.now()
    }

    /// Queues `task` for the next turn.
    pub fn post(&self, task: impl FnOnce() + 'static) {
        self.state.queue.borrow_mut().push_back(Box::new(task));
    }

    /// Runs `task` once, on the first turn at or after `now + delay`.
    pub fn single_shot(&self, delay: Duration, task: impl FnOnce() + 'static) -> TimerId {
        let id = TimerId(self.state.next_timer_id.get());
        self.state.next_timer_id.set(id.0 + 1);
        let now = self.now();
        let deadline = now
            .checked_add(delay)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        self.state.timers.borrow_mut().push(PendingTimer {
            id,
            deadline,
            task: Box::new(task),
        });
        trace!(
            "event=timer_schedule module=event_loop timer_id={} delay_ms={}",
            id.0,
            delay.as_millis()
        );
        id
    }

    /// Returns whether any task or timer is still waiting.
    pub fn has_pending(&self) -> bool {
        !self.state.queue.borrow().is_empty() || !self.state.timers.borrow().is_empty()
    }

    /// Earliest timer deadline, if any timer is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.state
            .timers
            .borrow()
            .iter()
            .map(|timer| timer.deadline)
            .min()
    }

    /// Runs one turn and returns how many callbacks ran.
    ///
    /// Both the due timers and the queued tasks are taken before any of them
    /// runs, so work scheduled from inside a callback waits for a later turn.
    pub fn process_events(&self) -> usize {
        let now = self.now();
        let mut due: Vec<PendingTimer> = {
            let mut timers = self.state.timers.borrow_mut();
            let (due, waiting) = std::mem::take(&mut *timers)
                .into_iter()
                .partition(|timer| timer.deadline <= now);
            *timers = waiting;
            due
        };
        due.sort_by_key(|timer| (timer.deadline, timer.id));
        let queued = std::mem::take(&mut *self.state.queue.borrow_mut());

        let mut ran = 0;
        for timer in due {
            trace!("event=timer_fire module=event_loop timer_id={}", timer.id.0);
            (timer.task)();
            ran += 1;
        }
        for task in queued {
            task();
            ran += 1;
        }
        ran
    }

    /// Runs turns until no task is queued, without waiting for timers.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        for _ in 0..MAX_IDLE_TURNS {
            if self.state.queue.borrow().is_empty() {
                break;
            }
            ran += self.process_events();
        }
        ran
    }

    /// Drives the loop for `duration` of clock time.
    ///
    /// Between turns the loop sleeps until the next timer (or the end of the
    /// window) when nothing is queued.
    pub fn run_for(&self, duration: Duration) -> usize {
        let end = self.now() + duration;
        let mut ran = 0;
        loop {
            ran += self.process_events();
            if self.now() >= end {
                break;
            }
            if !self.state.queue.borrow().is_empty() {
                continue;
            }
            let wake = self.next_deadline().map_or(end, |deadline| deadline.min(end));
            self.state.clock.sleep_until(wake);
        }
        ran
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}
