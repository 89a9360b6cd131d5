//! Transition Combinator.
//!
//! Merges the transition sources of one screen into a single stream of
//! candidates. Candidates are evaluated one at a time against the live state,
//! each after its predecessor's result has been committed, and admitted
//! results overwrite the State Store. Events of one source keep their order.

use super::store::StateStore;
use crate::core::{State, StateTransition};
use futures::stream::{self, BoxStream, SelectAll, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, trace};

/// Outcome of evaluating one candidate against the current state.
pub enum Admission<S> {
    /// The guard passed and the pipeline produced the next state.
    Transition(S),
    /// The guard passed and the pipeline only performed a side effect.
    SideEffect,
    /// The guard (or a filter) rejected the event.
    Rejected,
}

impl<S: fmt::Debug> fmt::Debug for Admission<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transition(next) => f.debug_tuple("Transition").field(next).finish(),
            Self::SideEffect => f.write_str("SideEffect"),
            Self::Rejected => f.write_str("Rejected"),
        }
    }
}

/// One event waiting to be evaluated against the live state.
pub type Candidate<S> = Box<dyn FnOnce(&S) -> Admission<S> + Send>;

/// A finished guarded pipeline, ready to be merged with others.
pub struct TransitionSource<S> {
    candidates: BoxStream<'static, Candidate<S>>,
}

impl<S: State> TransitionSource<S> {
    pub fn new(candidates: impl Stream<Item = Candidate<S>> + Send + 'static) -> Self {
        Self {
            candidates: candidates.boxed(),
        }
    }

    /// A source that never produces a candidate.
    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    pub fn into_stream(self) -> BoxStream<'static, Candidate<S>> {
        self.candidates
    }
}

impl<S> fmt::Debug for TransitionSource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionSource").finish_non_exhaustive()
    }
}

/// The merged candidate stream of one screen.
pub struct Transitions<S> {
    merged: SelectAll<BoxStream<'static, Candidate<S>>>,
}

/// Merge transition sources into a single candidate stream.
///
/// The merged stream completes once every source has completed.
pub fn transitions<S: State>(sources: Vec<TransitionSource<S>>) -> Transitions<S> {
    Transitions {
        merged: stream::select_all(sources.into_iter().map(TransitionSource::into_stream)),
    }
}

impl<S: State> Transitions<S> {
    /// Drive every candidate into `store` until all sources complete.
    pub async fn bind(mut self, store: StateStore<S>) {
        while let Some(candidate) = self.next().await {
            admit(&store, candidate);
        }
    }
}

impl<S> Stream for Transitions<S> {
    type Item = Candidate<S>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.merged).poll_next(cx)
    }
}

impl<S> fmt::Debug for Transitions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transitions")
            .field("sources", &self.merged.len())
            .finish()
    }
}

/// Evaluate `candidate` against the current state of `store` and apply the
/// result.
///
/// Returns the transition record when the state changed.
pub(crate) fn admit<S: State>(
    store: &StateStore<S>,
    candidate: Candidate<S>,
) -> Option<StateTransition<S>> {
    let current = store.current();
    match candidate(&current) {
        Admission::Transition(next) => {
            let transition = store.apply(next);
            debug!(
                from = transition.from.name(),
                to = transition.to.name(),
                attempt = transition.attempt,
                "state transition"
            );
            Some(transition)
        }
        Admission::SideEffect => {
            debug!(state = current.name(), "guarded side effect");
            None
        }
        Admission::Rejected => {
            trace!(state = current.name(), "event rejected by guard");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Extractor, Guard};
    use crate::reactive::{EventRelay, GuardedExt};
    use crate::test_support::settle;

    #[derive(Clone, PartialEq, Debug)]
    enum TestState {
        Idle,
        Loading,
        Loaded { value: u32 },
        Failed { reason: String },
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Loading => "Loading",
                Self::Loaded { .. } => "Loaded",
                Self::Failed { .. } => "Failed",
            }
        }
    }

    struct Fixture {
        start: EventRelay<()>,
        loaded: EventRelay<u32>,
        failed: EventRelay<String>,
        store: StateStore<TestState>,
    }

    fn fixture() -> Fixture {
        let fixture = Fixture {
            start: EventRelay::new(),
            loaded: EventRelay::new(),
            failed: EventRelay::new(),
            store: StateStore::new(TestState::Idle),
        };
        let loading = || Guard::new(|s: &TestState| matches!(s, TestState::Loading));
        let merged = transitions(vec![
            fixture
                .start
                .subscribe()
                .guarded_by(Guard::new(|s: &TestState| matches!(s, TestState::Idle | TestState::Failed { .. })))
                .to_state(|_| TestState::Loading),
            fixture
                .loaded
                .subscribe()
                .guarded_by(loading())
                .to_state(|value| TestState::Loaded { value }),
            fixture
                .failed
                .subscribe()
                .guarded_by(loading())
                .to_state(|reason| TestState::Failed { reason }),
        ]);
        tokio::spawn(merged.bind(fixture.store.clone()));
        fixture
    }

    #[tokio::test]
    async fn admitted_events_drive_the_store() {
        let f = fixture();

        f.start.accept(());
        settle().await;
        f.loaded.accept(3);
        settle().await;

        assert_eq!(f.store.current(), TestState::Loaded { value: 3 });
    }

    #[tokio::test]
    async fn stale_response_is_dropped() {
        let f = fixture();

        f.start.accept(());
        settle().await;
        f.failed.accept("offline".to_string());
        settle().await;
        // late success for the request that already failed
        f.loaded.accept(1);
        settle().await;

        assert_eq!(
            f.store.current(),
            TestState::Failed {
                reason: "offline".to_string()
            }
        );
    }

    #[tokio::test]
    async fn rejected_events_leave_no_history() {
        let f = fixture();

        f.loaded.accept(1);
        f.failed.accept("x".to_string());
        settle().await;

        assert_eq!(f.store.current(), TestState::Idle);
        assert!(f.store.read_only().history().transitions().is_empty());
    }

    #[tokio::test]
    async fn extractor_guard_uses_live_payload() {
        let retry = EventRelay::new();
        let store = StateStore::new(TestState::Failed {
            reason: "first".to_string(),
        });
        let merged = transitions(vec![retry
            .subscribe()
            .filter_mapped_by(Extractor::new(|s: &TestState| match s {
                TestState::Failed { reason } => Some(reason.clone()),
                _ => None,
            }))
            .to_state(|((), reason)| TestState::Failed {
                reason: format!("{reason}+"),
            })]);
        tokio::spawn(merged.bind(store.clone()));

        // both queued before the owner task runs; the second is judged
        // against the state committed by the first
        retry.accept(());
        retry.accept(());
        settle().await;

        assert_eq!(
            store.current(),
            TestState::Failed {
                reason: "first++".to_string()
            }
        );
        assert_eq!(store.read_only().history().last().map(|t| t.attempt), Some(2));
    }

    #[tokio::test]
    async fn merged_stream_completes_with_its_sources() {
        let store = StateStore::new(TestState::Idle);
        let merged = transitions::<TestState>(vec![TransitionSource::empty(), TransitionSource::empty()]);

        merged.bind(store.clone()).await;
        assert_eq!(store.current(), TestState::Idle);
    }
}
