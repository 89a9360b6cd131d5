//! The owner task of one screen.
//!
//! A single task evaluates every state candidate and applies every data model
//! update, so all writes to a screen's stores are serialized. Model updates
//! are drained before state candidates, which keeps guards reading the latest
//! field values through `with_latest`.

use super::data_model::ModelUpdates;
use super::dispose::DisposeBag;
use super::store::{DataModelStore, StateStore};
use super::transitions::{admit, Transitions};
use crate::core::State;
use crate::navigation::ScreenId;
use futures::StreamExt;
use tracing::{debug, info_span, Instrument};

/// Everything the owner task of one screen drives.
pub struct ScreenLoop<S: State, M> {
    pub kind: &'static str,
    pub id: ScreenId,
    pub state: StateStore<S>,
    pub transitions: Transitions<S>,
    pub model: DataModelStore<M>,
    pub updates: ModelUpdates<M>,
}

impl<S: State, M: Clone + Send + 'static> ScreenLoop<S, M> {
    /// Spawn the loop into `bag`, inside a `screen` span.
    pub fn spawn(self, bag: &DisposeBag) {
        let span = info_span!("screen", kind = self.kind, id = %self.id);
        bag.spawn(self.run().instrument(span));
    }

    async fn run(self) {
        let Self {
            state,
            mut transitions,
            model,
            mut updates,
            ..
        } = self;
        debug!(initial = state.current().name(), "screen started");

        loop {
            tokio::select! {
                biased;
                Some(update) = updates.next() => {
                    let next = update(&model.current());
                    model.apply(next);
                }
                Some(candidate) = transitions.next() => {
                    admit(&state, candidate);
                }
                else => break,
            }
        }

        debug!(last = state.current().name(), "screen stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Guard;
    use crate::reactive::{field, merge_fields, transitions, EventRelay, GuardedExt};
    use crate::test_support::settle;

    #[derive(Clone, PartialEq, Debug)]
    enum TestState {
        Input,
        Sending { phone: String },
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Input => "Input",
                Self::Sending { .. } => "Sending",
            }
        }
    }

    #[tokio::test]
    async fn tap_reads_model_updated_just_before() {
        let phone = EventRelay::new();
        let tap = EventRelay::new();
        let state = StateStore::new(TestState::Input);
        let model = DataModelStore::new(String::new());
        let bag = DisposeBag::new();

        ScreenLoop {
            kind: "test",
            id: ScreenId::new(),
            state: state.clone(),
            transitions: transitions(vec![tap
                .subscribe()
                .guarded_by(Guard::new(|s: &TestState| matches!(s, TestState::Input)))
                .with_latest(model.read_only())
                .to_state(|((), phone)| TestState::Sending { phone })]),
            model: model.clone(),
            updates: merge_fields(vec![field(phone.subscribe(), |_: &String, value: String| value)]),
        }
        .spawn(&bag);

        phone.accept("79991234567".to_string());
        tap.accept(());
        settle().await;

        assert_eq!(
            state.current(),
            TestState::Sending {
                phone: "79991234567".to_string()
            }
        );
    }

    #[tokio::test]
    async fn dropping_the_bag_stops_the_loop() {
        let tap = EventRelay::new();
        let state = StateStore::new(TestState::Input);
        let model = DataModelStore::new(());
        let bag = DisposeBag::new();

        ScreenLoop {
            kind: "test",
            id: ScreenId::new(),
            state: state.clone(),
            transitions: transitions(vec![tap
                .subscribe()
                .guarded_by(Guard::always())
                .to_state(|phone: String| TestState::Sending { phone })]),
            model,
            updates: merge_fields(Vec::new()),
        }
        .spawn(&bag);
        settle().await;

        drop(bag);
        settle().await;
        tap.accept("1".to_string());
        settle().await;

        assert_eq!(state.current(), TestState::Input);
        assert_eq!(tap.subscriber_count(), 0);
    }
}
