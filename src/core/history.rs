//! State transition history tracking.
//!
//! Provides the read-only, time-ordered view of every transition a State
//! Store applied.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Transitions a history keeps unless told otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Record of a single applied transition.
///
/// # Example
///
/// ```rust
/// use stateful_screens::core::{State, StateTransition};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Phase {
///     Input,
///     Sending,
/// }
///
/// impl State for Phase {
///     fn name(&self) -> &str {
///         match self {
///             Self::Input => "Input",
///             Self::Sending => "Sending",
///         }
///     }
/// }
///
/// let transition = StateTransition {
///     from: Phase::Input,
///     to: Phase::Sending,
///     timestamp: Utc::now(),
///     attempt: 1,
/// };
/// assert_eq!(transition.to.name(), "Sending");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition<S> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition was applied
    pub timestamp: DateTime<Utc>,
    /// Consecutive entries into the target variant, starting at 1
    pub attempt: usize,
}

/// Ordered history of applied transitions.
///
/// Only the most recent `limit` transitions are kept; older ones are evicted
/// first. [`StateHistory::record`] returns a new history with the transition
/// appended, [`StateHistory::push`] appends in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateHistory<S> {
    transitions: VecDeque<StateTransition<S>>,
    limit: usize,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history keeping [`DEFAULT_HISTORY_LIMIT`]
    /// transitions.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a new empty history keeping at most `limit` transitions.
    ///
    /// A limit of zero is raised to one, so the last transition and its
    /// attempt count are always known.
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            transitions: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
        }
    }

    /// Maximum number of transitions kept.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut history = self.clone();
        history.push(transition);
        history
    }

    /// Append a transition in place, evicting the oldest one when full.
    pub fn push(&mut self, transition: StateTransition<S>) {
        if self.transitions.len() == self.limit {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Attempt number a transition into `to` would carry.
    ///
    /// Re-entering the variant the history currently ends in increments the
    /// last attempt; entering any other variant starts again at 1.
    pub fn next_attempt(&self, to: &S) -> usize {
        match self.transitions.back() {
            Some(last) if last.to.name() == to.name() => last.attempt + 1,
            _ => 1,
        }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest kept transition followed by the
    /// `to` state of each transition, in the order they were applied.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stateful_screens::core::{State, StateHistory, StateTransition};
    /// use chrono::Utc;
    ///
    /// #[derive(Clone, PartialEq, Debug)]
    /// enum Phase { One, Two, Three }
    ///
    /// impl State for Phase {
    ///     fn name(&self) -> &str {
    ///         match self {
    ///             Self::One => "One",
    ///             Self::Two => "Two",
    ///             Self::Three => "Three",
    ///         }
    ///     }
    /// }
    ///
    /// let history = StateHistory::new()
    ///     .record(StateTransition {
    ///         from: Phase::One,
    ///         to: Phase::Two,
    ///         timestamp: Utc::now(),
    ///         attempt: 1,
    ///     })
    ///     .record(StateTransition {
    ///         from: Phase::Two,
    ///         to: Phase::Three,
    ///         timestamp: Utc::now(),
    ///         attempt: 1,
    ///     });
    ///
    /// assert_eq!(history.get_path(), vec![&Phase::One, &Phase::Two, &Phase::Three]);
    /// ```
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Duration between the first and last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all kept transitions in the order they were applied.
    pub fn transitions(&self) -> &VecDeque<StateTransition<S>> {
        &self.transitions
    }

    /// The most recent transition, if any.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }
}
