//! View-facing values and projections shared by the presenters.

use crate::core::{State, StateHistory};
use crate::reactive::{DistinctExt, Driver, ReadOnlyState, Signal, Snapshot};
use futures::future;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

/// An error alert with a single retry button.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessageViewModel {
    pub title: String,
    pub button_title: String,
}

impl ErrorMessageViewModel {
    /// Alert showing `error`'s description.
    pub fn for_error(error: &impl std::fmt::Display, button_title: &str) -> Self {
        Self {
            title: error.to_string(),
            button_title: button_title.to_string(),
        }
    }
}

/// A value shown under a caption, possibly missing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TitledOptionalText {
    pub title: String,
    pub maybe_text: Option<String>,
}

impl TitledOptionalText {
    pub fn new(title: impl Into<String>, maybe_text: Option<String>) -> Self {
        Self {
            title: title.into(),
            maybe_text,
        }
    }
}

/// Loading indicator visibility, derived from the loading category of the
/// current state.
pub fn loading_indicator_driver<S: State>(state: &ReadOnlyState<S>) -> Driver<bool> {
    let state = state.clone();
    Driver::new(move || {
        state
            .subscribe()
            .map(|s| s.should_loading_indicator_be_visible())
            .distinct_until_changed()
    })
}

/// Loading feedback for screens with pull-to-refresh.
pub struct RefreshIndicators {
    /// Full-screen indicator, visible only while loading before any data
    /// was ever loaded.
    pub initial_loading_indicator_visible: Driver<bool>,
    /// Fires when a refresh started after data was loaded finishes.
    pub hide_refresh_control: Signal<()>,
}

/// Split loading feedback into the initial indicator and the refresh control.
pub fn refresh_loading_indicator_events<S: State>(state: &ReadOnlyState<S>) -> RefreshIndicators {
    let initial = {
        let state = state.clone();
        Driver::new(move || {
            let Snapshot {
                current,
                history,
                changes,
            } = state.snapshot();
            let mut loaded_before = ever_loaded(&current, &history);
            stream::once(future::ready(current))
                .chain(changes)
                .map(move |s| {
                    loaded_before |= s.is_data_loaded();
                    s.is_loading() && !loaded_before
                })
                .distinct_until_changed()
        })
    };

    let hide = {
        let state = state.clone();
        Signal::new(move || {
            let Snapshot {
                current: mut previous,
                history,
                changes,
            } = state.snapshot();
            let mut loaded_before = ever_loaded(&previous, &history);
            changes
                .filter_map(move |next| {
                    let refresh_finished =
                        previous.is_loading() && loaded_before && !next.is_loading();
                    loaded_before |= next.is_data_loaded();
                    previous = next;
                    future::ready(refresh_finished.then_some(()))
                })
                .boxed()
        })
    };

    RefreshIndicators {
        initial_loading_indicator_visible: initial,
        hide_refresh_control: hide,
    }
}

fn ever_loaded<S: State>(current: &S, history: &StateHistory<S>) -> bool {
    current.is_data_loaded()
        || history
            .transitions()
            .iter()
            .any(|t| t.from.is_data_loaded() || t.to.is_data_loaded())
}
