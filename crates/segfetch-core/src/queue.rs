//! Bounded blocking work queue with an in-flight counter.
//!
//! Multiple producers and consumers share one `WorkQueue`. `push` blocks while
//! the queue is at capacity (backpressure); `pop` blocks while it is empty.
//! Every accepted item increments an unfinished counter that consumers
//! decrement with `task_done` once the item is fully handled, so
//! `wait_idle` returns only when the queue is empty *and* nothing popped is
//! still being processed. Queues whose completion is decided by closure alone
//! (the download queue) never call either. Consumers that feed work back into the same queue
//! use `push_overflow`, which ignores the capacity bound so a consumer can
//! never block on its own queue.
//!
//! Closing a queue stops new pushes; consumers drain what is left and then
//! `pop` returns `None`. Cancellation makes every wait return immediately.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::control::CancelToken;

/// How often blocked callers re-check the cancel token.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Why a push was refused. The item is handed back.
#[derive(Debug, PartialEq, Eq)]
pub enum PushError<T> {
    Closed(T),
    Cancelled(T),
}

impl<T> PushError<T> {
    pub fn into_inner(self) -> T {
        match self {
            PushError::Closed(t) | PushError::Cancelled(t) => t,
        }
    }
}

struct State<T> {
    items: VecDeque<T>,
    unfinished: usize,
    closed: bool,
}

pub struct WorkQueue<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    idle: Condvar,
    capacity: usize,
    cancel: CancelToken,
}

impl<T> WorkQueue<T> {
    /// New queue holding at most `capacity` items (minimum 1) between
    /// producers and consumers.
    pub fn new(capacity: usize, cancel: CancelToken) -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity.max(1)),
                unfinished: 0,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            idle: Condvar::new(),
            capacity: capacity.max(1),
            cancel,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'g>(&self, cv: &Condvar, guard: MutexGuard<'g, State<T>>) -> MutexGuard<'g, State<T>> {
        cv.wait_timeout(guard, CANCEL_POLL)
            .unwrap_or_else(PoisonError::into_inner)
            .0
    }

    /// Enqueue, blocking while the queue is full.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut state = self.lock();
        loop {
            if self.cancel.is_cancelled() {
                return Err(PushError::Cancelled(item));
            }
            if state.closed {
                return Err(PushError::Closed(item));
            }
            if state.items.len() < self.capacity {
                break;
            }
            state = self.wait(&self.not_full, state);
        }
        state.items.push_back(item);
        state.unfinished += 1;
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Enqueue from a consumer without waiting for capacity.
    ///
    /// Accepted after `close` as long as the queue is not cancelled: the caller
    /// still holds an unfinished item, so the queue cannot have gone idle.
    pub fn push_overflow(&self, item: T) -> Result<(), PushError<T>> {
        if self.cancel.is_cancelled() {
            return Err(PushError::Cancelled(item));
        }
        let mut state = self.lock();
        state.items.push_back(item);
        state.unfinished += 1;
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue, blocking while the queue is empty. `None` once the queue is
    /// closed and drained, or cancelled.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self.wait(&self.not_empty, state);
        }
    }

    /// Mark one popped item as fully handled.
    pub fn task_done(&self) {
        let mut state = self.lock();
        state.unfinished = state.unfinished.saturating_sub(1);
        if state.unfinished == 0 {
            drop(state);
            self.idle.notify_all();
        }
    }

    /// Block until every accepted item has been marked done.
    /// Returns `false` if cancelled first.
    pub fn wait_idle(&self) -> bool {
        let mut state = self.lock();
        loop {
            if self.cancel.is_cancelled() {
                return false;
            }
            if state.unfinished == 0 {
                return true;
            }
            state = self.wait(&self.idle, state);
        }
    }

    /// Refuse further `push` calls. Consumers drain remaining items.
    pub fn close(&self) {
        self.lock().closed = true;
        self.wake_all();
    }

    /// Wake every blocked caller so it re-checks closure and cancellation.
    pub fn wake_all(&self) {
        self.not_empty.notify_all();
        self.not_full.notify_all();
        self.idle.notify_all();
    }

    /// Items accepted but not yet marked done.
    pub fn unfinished(&self) -> usize {
        self.lock().unfinished
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
