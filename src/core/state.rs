//! Core State trait for screen states.
//!
//! Every screen state is a closed enum; exactly one variant is current at any
//! instant. The trait exposes pure classification methods that presenters
//! use instead of matching on concrete variants.

use std::fmt::Debug;

/// Trait for screen states.
///
/// All methods are pure - no side effects. States are immutable values that
/// describe the current position of a screen's state machine. Variants may
/// carry payload (a phone number, an error, a profile).
///
/// # Required Traits
///
/// - `Clone`: states are replayed to every subscriber and recorded in history
/// - `PartialEq`: presenters compare consecutive projections
/// - `Debug`: states appear in diagnostics
/// - `Send` + `Sync`: states cross from the owner task to subscribers
///
/// # Example
///
/// ```rust
/// use stateful_screens::core::State;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum LoadState {
///     Loading,
///     Loaded { items: Vec<String> },
///     Failed { reason: String },
/// }
///
/// impl State for LoadState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Loading => "Loading",
///             Self::Loaded { .. } => "Loaded",
///             Self::Failed { .. } => "Failed",
///         }
///     }
///
///     fn is_loading(&self) -> bool {
///         matches!(self, Self::Loading)
///     }
///
///     fn is_loading_error(&self) -> bool {
///         matches!(self, Self::Failed { .. })
///     }
/// }
///
/// assert!(LoadState::Loading.should_loading_indicator_be_visible());
/// assert!(!LoadState::Loaded { items: vec![] }.is_loading());
/// ```
pub trait State: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Get the variant's name for display/logging.
    fn name(&self) -> &str;

    /// Check if the state waits for an asynchronous response.
    ///
    /// Default implementation returns `false`.
    fn is_loading(&self) -> bool {
        false
    }

    /// Check if the state represents successfully obtained data.
    ///
    /// Default implementation returns `false`.
    fn is_data_loaded(&self) -> bool {
        false
    }

    /// Check if the state carries an error the user may retry.
    ///
    /// Default implementation returns `false`.
    fn is_loading_error(&self) -> bool {
        false
    }

    /// Check if this is a terminal state.
    ///
    /// Terminal states have no outgoing transition inside the screen itself;
    /// leaving them is driven by an external event.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Whether the loading indicator must be shown for this state.
    ///
    /// Defaults to [`State::is_loading`].
    fn should_loading_indicator_be_visible(&self) -> bool {
        self.is_loading()
    }
}
