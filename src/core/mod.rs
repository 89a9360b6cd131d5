//! Core state machine types and logic.
//!
//! This module contains the pure core shared by every screen:
//! - State definitions via the `State` trait
//! - Boolean and extracting guards
//! - Immutable history tracking
//!
//! Nothing in this module performs I/O or spawns tasks; the reactive shell
//! lives in [`crate::reactive`].

mod guard;
mod history;
mod state;

pub use guard::{Extractor, Guard};
pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_LIMIT};
pub use state::State;
