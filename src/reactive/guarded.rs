//! Guarded event pipelines.
//!
//! An event stream becomes a transition source in three steps: guard it
//! against the screen state, optionally enrich and act on the admitted event,
//! and finally map it to the next state (or to a routing side effect).
//!
//! ```rust
//! use stateful_screens::core::{Guard, State};
//! use stateful_screens::reactive::{EventRelay, GuardedExt, TransitionSource};
//!
//! #[derive(Clone, PartialEq, Debug)]
//! enum Phase {
//!     Input,
//!     Sending,
//! }
//!
//! impl State for Phase {
//!     fn name(&self) -> &str {
//!         match self {
//!             Self::Input => "Input",
//!             Self::Sending => "Sending",
//!         }
//!     }
//! }
//!
//! let taps = EventRelay::<()>::new();
//! let source: TransitionSource<Phase> = taps
//!     .subscribe()
//!     .guarded_by(Guard::new(|s: &Phase| matches!(s, Phase::Input)))
//!     .effect(|_| println!("request sent"))
//!     .to_state(|_| Phase::Sending);
//! # drop(source);
//! ```
//!
//! Nothing in a pipeline runs when the event is produced. Each event turns
//! into a deferred evaluation that the screen's owner task runs against the
//! live state immediately before applying the result, so the guard never sees
//! a snapshot older than the previously committed transition.

use super::store::ReadOnly;
use super::transitions::{Admission, Candidate, TransitionSource};
use crate::core::{Extractor, Guard, State};
use futures::stream::{BoxStream, Stream, StreamExt};
use std::sync::Arc;

/// Deferred evaluation of one event against the live state.
pub type Pending<S, T> = Box<dyn FnOnce(&S) -> Option<T> + Send>;

type Step<T, U> = Arc<dyn Fn(T) -> Option<U> + Send + Sync>;

/// An event stream whose events are admitted by a guard.
pub struct Guarded<S, T> {
    pending: BoxStream<'static, Pending<S, T>>,
}

/// Entry points turning any event stream into a [`Guarded`] pipeline.
pub trait GuardedExt: Stream + Sized + Send + 'static
where
    Self::Item: Send + 'static,
{
    /// Admit events only while `guard` holds for the current state.
    fn guarded_by<S: State>(self, guard: Guard<S>) -> Guarded<S, Self::Item> {
        Guarded {
            pending: self
                .map(move |event| {
                    let guard = guard.clone();
                    Box::new(move |state: &S| guard.check(state).then_some(event))
                        as Pending<S, Self::Item>
                })
                .boxed(),
        }
    }

    /// Admit events only while `extractor` finds a payload in the current
    /// state, pairing each event with that payload.
    fn filter_mapped_by<S, P>(self, extractor: Extractor<S, P>) -> Guarded<S, (Self::Item, P)>
    where
        S: State,
        P: Send + 'static,
    {
        Guarded {
            pending: self
                .map(move |event| {
                    let extractor = extractor.clone();
                    Box::new(move |state: &S| extractor.extract(state).map(|payload| (event, payload)))
                        as Pending<S, (Self::Item, P)>
                })
                .boxed(),
        }
    }
}

impl<St> GuardedExt for St
where
    St: Stream + Send + 'static,
    St::Item: Send + 'static,
{
}

impl<S: State, T: Send + 'static> Guarded<S, T> {
    fn then<U: Send + 'static>(self, step: Step<T, U>) -> Guarded<S, U> {
        Guarded {
            pending: self
                .pending
                .map(move |pending| {
                    let step = Arc::clone(&step);
                    Box::new(move |state: &S| pending(state).and_then(|value| step(value)))
                        as Pending<S, U>
                })
                .boxed(),
        }
    }

    /// Transform an admitted event.
    pub fn map<U, F>(self, f: F) -> Guarded<S, U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.then(Arc::new(move |value| Some(f(value))))
    }

    /// Transform an admitted event, dropping it when `f` returns `None`.
    pub fn filter_map<U, F>(self, f: F) -> Guarded<S, U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        self.then(Arc::new(f))
    }

    /// Pair an admitted event with the latest value of `latest`, read at the
    /// moment the event is admitted.
    pub fn with_latest<M>(self, latest: ReadOnly<M>) -> Guarded<S, (T, M)>
    where
        M: Clone + Send + 'static,
    {
        self.then(Arc::new(move |value| Some((value, latest.current()))))
    }

    /// Run a side effect exactly once per admitted event, before the event
    /// is mapped to the next state.
    pub fn effect<F>(self, f: F) -> Guarded<S, T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.then(Arc::new(move |value| {
            f(&value);
            Some(value)
        }))
    }

    /// Finish the pipeline with the next state for every admitted event.
    pub fn to_state<F>(self, f: F) -> TransitionSource<S>
    where
        F: Fn(T) -> S + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        TransitionSource::new(self.pending.map(move |pending| {
            let f = Arc::clone(&f);
            Box::new(move |state: &S| match pending(state) {
                Some(value) => Admission::Transition(f(value)),
                None => Admission::Rejected,
            }) as Candidate<S>
        }))
    }

    /// Finish the pipeline with a navigation side effect that leaves the
    /// state untouched.
    pub fn route<F>(self, f: F) -> TransitionSource<S>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        TransitionSource::new(self.pending.map(move |pending| {
            let f = Arc::clone(&f);
            Box::new(move |state: &S| match pending(state) {
                Some(value) => {
                    f(value);
                    Admission::SideEffect
                }
                None => Admission::Rejected,
            }) as Candidate<S>
        }))
    }
}
