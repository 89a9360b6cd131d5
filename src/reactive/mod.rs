//! Reactive shell around the pure core.
//!
//! Relays carry view events and service responses, stores hold the current
//! state and data model of a screen, guarded pipelines turn events into
//! transition candidates, and the screen loop applies them one at a time.

mod data_model;
mod dispose;
mod guarded;
mod relay;
mod screen;
mod signal;
mod store;
mod transitions;

pub use data_model::{field, merge_fields, FieldUpdates, ModelUpdate, ModelUpdates};
pub use dispose::DisposeBag;
pub use guarded::{Guarded, GuardedExt, Pending};
pub use relay::{BehaviorRelay, EventRelay, Subscription};
pub use screen::ScreenLoop;
pub use signal::{DistinctExt, Driver, Signal};
pub use store::{DataModelStore, ReadOnly, ReadOnlyState, Snapshot, StateStore};
pub use transitions::{transitions, Admission, Candidate, TransitionSource, Transitions};
