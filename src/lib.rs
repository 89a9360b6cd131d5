//! Stateful screens: guarded reactive state machines for screen interactors
//!
//! Every screen owns a closed state enum, a data model holding its form
//! input, and a set of transition sources. A transition source is a stream of
//! events (view taps, text changes, service responses) that is guarded
//! against the screen's state and mapped to the next state. The guard runs
//! against the live state right before the transition is applied, so a late
//! response to a superseded request is dropped instead of overwriting newer
//! state.
//!
//! # Core Concepts
//!
//! - **State**: Type-safe state representation via the `State` trait
//! - **Guards**: Pure predicates and payload extractors over the current state
//! - **History**: Immutable tracking of state transitions over time
//! - **Relays and stores**: Hot event sources and the observable state holders
//! - **Requests**: Fire-and-forget service calls whose completions come back
//!   as events
//!
//! # Example
//!
//! ```rust
//! use stateful_screens::core::Guard;
//! use stateful_screens::reactive::{EventRelay, GuardedExt, StateStore};
//! use stateful_screens::{screen_state, transitions};
//!
//! #[derive(Clone, PartialEq, Debug)]
//! enum LoginState {
//!     Input,
//!     Sending { phone: String },
//! }
//!
//! screen_state! {
//!     LoginState { Input, Sending }
//!     loading: [Sending]
//! }
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! # runtime.block_on(async {
//! let taps = EventRelay::new();
//! let store = StateStore::new(LoginState::Input);
//!
//! let merged = transitions![
//!     taps.subscribe()
//!         .guarded_by(Guard::new(|s: &LoginState| matches!(s, LoginState::Input)))
//!         .to_state(|phone: String| LoginState::Sending { phone }),
//! ];
//! tokio::spawn(merged.bind(store.clone()));
//!
//! taps.accept("79991234567".to_string());
//! taps.accept("ignored while sending".to_string());
//! tokio::time::sleep(std::time::Duration::from_millis(10)).await;
//!
//! assert_eq!(
//!     store.current(),
//!     LoginState::Sending { phone: "79991234567".to_string() }
//! );
//! # });
//! ```

pub mod config;
pub mod core;
pub mod effects;
pub mod format;
pub mod logging;
mod macros;
pub mod navigation;
pub mod presentation;
pub mod reactive;
pub mod screens;
pub mod services;
pub mod validation;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::ScreensConfig;
pub use core::{Extractor, Guard, State, StateHistory, StateTransition};
pub use reactive::{Driver, EventRelay, GuardedExt, ReadOnlyState, Signal, StateStore};
