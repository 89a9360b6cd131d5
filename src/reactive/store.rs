//! State Store and Screen Data Model Store.
//!
//! Both stores hold one authoritative value per screen and expose it through
//! read-only handles. Writes are crate-private: the state store is written
//! only by the transition combinator, the data model store only by the data
//! model updater, both from the screen's owner task.

use super::relay::{BehaviorRelay, Subscription};
use super::signal::{Driver, Signal};
use crate::core::{State, StateHistory, StateTransition};
use chrono::Utc;
use futures::StreamExt;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Holds the current state of one screen plus the history of transitions.
pub struct StateStore<S: State> {
    relay: BehaviorRelay<S>,
    history: Arc<Mutex<StateHistory<S>>>,
}

impl<S: State> StateStore<S> {
    pub fn new(initial: S) -> Self {
        Self::with_history(initial, StateHistory::new())
    }

    /// Store keeping at most `limit` transitions in its history.
    pub fn with_history_limit(initial: S, limit: usize) -> Self {
        Self::with_history(initial, StateHistory::with_limit(limit))
    }

    fn with_history(initial: S, history: StateHistory<S>) -> Self {
        Self {
            relay: BehaviorRelay::new(initial),
            history: Arc::new(Mutex::new(history)),
        }
    }

    /// The current state.
    pub fn current(&self) -> S {
        self.relay.value()
    }

    /// Read-only handle for presenters and guards.
    pub fn read_only(&self) -> ReadOnlyState<S> {
        ReadOnlyState {
            relay: self.relay.clone(),
            history: Arc::clone(&self.history),
        }
    }

    /// Overwrite the current state unconditionally and notify subscribers.
    ///
    /// Returns the transition record appended to the history. The history
    /// lock is held until subscribers are notified, so a [`Snapshot`] never
    /// sees a history ahead of the current state.
    pub(crate) fn apply(&self, next: S) -> StateTransition<S> {
        let mut history = self.history.lock();
        let transition = StateTransition {
            from: self.relay.value(),
            attempt: history.next_attempt(&next),
            to: next.clone(),
            timestamp: Utc::now(),
        };
        history.push(transition.clone());
        self.relay.accept(next);
        transition
    }
}

impl<S: State> Clone for StateStore<S> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
            history: Arc::clone(&self.history),
        }
    }
}

impl<S: State> fmt::Debug for StateStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

/// Consistent view of a store at one instant.
pub struct Snapshot<S: State> {
    pub current: S,
    pub history: StateHistory<S>,
    /// Every state applied after `current`.
    pub changes: Subscription<S>,
}

/// Read-only view of a [`StateStore`].
pub struct ReadOnlyState<S: State> {
    relay: BehaviorRelay<S>,
    history: Arc<Mutex<StateHistory<S>>>,
}

impl<S: State> ReadOnlyState<S> {
    /// The current state. Always up to date.
    pub fn current(&self) -> S {
        self.relay.value()
    }

    /// Infinite stream of states, starting with the current one.
    pub fn subscribe(&self) -> Subscription<S> {
        self.relay.subscribe()
    }

    /// Infinite stream of states applied from now on.
    pub fn changes(&self) -> Subscription<S> {
        self.relay.changes()
    }

    /// Snapshot of the time-ordered transition history.
    pub fn history(&self) -> StateHistory<S> {
        self.history.lock().clone()
    }

    /// Current state, history and a subscription to later states, with no
    /// transition committed in between.
    pub fn snapshot(&self) -> Snapshot<S> {
        let history = self.history.lock();
        let (current, changes) = self.relay.current_and_changes();
        Snapshot {
            current,
            history: history.clone(),
            changes,
        }
    }

    /// Replaying presenter output of the states.
    pub fn driver(&self) -> Driver<S> {
        let relay = self.relay.clone();
        Driver::new(move || relay.subscribe().boxed())
    }

    /// One-shot presenter output of the states applied after subscribing.
    pub fn signal(&self) -> Signal<S> {
        let relay = self.relay.clone();
        Signal::new(move || relay.changes().boxed())
    }
}

impl<S: State> Clone for ReadOnlyState<S> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
            history: Arc::clone(&self.history),
        }
    }
}

impl<S: State> fmt::Debug for ReadOnlyState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyState")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

/// Holds the current screen data model of one screen.
///
/// The data model has no guard: every field update applies.
pub struct DataModelStore<M> {
    relay: BehaviorRelay<M>,
}

impl<M: Clone + Send + 'static> DataModelStore<M> {
    pub fn new(initial: M) -> Self {
        Self {
            relay: BehaviorRelay::new(initial),
        }
    }

    pub fn current(&self) -> M {
        self.relay.value()
    }

    pub fn read_only(&self) -> ReadOnly<M> {
        ReadOnly {
            relay: self.relay.clone(),
        }
    }

    pub(crate) fn apply(&self, next: M) {
        self.relay.accept(next);
    }
}

impl<M> Clone for DataModelStore<M> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for DataModelStore<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DataModelStore").field(&self.relay).finish()
    }
}

/// Read-only view of a value held by a relay.
pub struct ReadOnly<T> {
    relay: BehaviorRelay<T>,
}

impl<T: Clone + Send + 'static> ReadOnly<T> {
    pub fn current(&self) -> T {
        self.relay.value()
    }

    pub fn subscribe(&self) -> Subscription<T> {
        self.relay.subscribe()
    }

    pub fn changes(&self) -> Subscription<T> {
        self.relay.changes()
    }

    pub fn driver(&self) -> Driver<T> {
        let relay = self.relay.clone();
        Driver::new(move || relay.subscribe().boxed())
    }

    pub fn signal(&self) -> Signal<T> {
        let relay = self.relay.clone();
        Signal::new(move || relay.changes().boxed())
    }
}

impl<T> Clone for ReadOnly<T> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
        }
    }
}

impl<T> From<BehaviorRelay<T>> for ReadOnly<T> {
    fn from(relay: BehaviorRelay<T>) -> Self {
        Self { relay }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadOnly<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadOnly").field(&self.relay).finish()
    }
}
