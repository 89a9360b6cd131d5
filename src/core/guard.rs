//! Guard predicates for admitting candidate transitions.
//!
//! Guards are pure functions evaluated against the live current state. A
//! boolean [`Guard`] admits or drops an event; an [`Extractor`] additionally
//! pulls a payload out of the state variant it matches.

use super::state::State;
use std::fmt;
use std::sync::Arc;

/// Pure predicate that determines if an event may cause a transition.
///
/// An event arriving while the guard returns `false` is dropped: it is
/// neither queued nor retried.
///
/// # Example
///
/// ```rust
/// use stateful_screens::core::{Guard, State};
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
/// let by_input = Guard::new(|s: &Phase| matches!(s, Phase::Input));
///
/// assert!(by_input.check(&Phase::Input));
/// assert!(!by_input.check(&Phase::Sending));
/// ```
pub struct Guard<S: State> {
    predicate: Arc<dyn Fn(&S) -> bool + Send + Sync>,
}

impl<S: State> Guard<S> {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Guard that admits every state. Used for stateless bindings.
    pub fn always() -> Self {
        Guard::new(|_| true)
    }

    /// Check if the guard admits an event in this state.
    pub fn check(&self, state: &S) -> bool {
        (self.predicate)(state)
    }
}

impl<S: State> Clone for Guard<S> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S: State> fmt::Debug for Guard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

/// Extracting guard: admits an event only when the state carries a payload.
///
/// Returns `None` to drop the event; `Some(payload)` admits it and hands the
/// payload downstream ("which phone number were we sending to when the
/// response arrived").
///
/// # Example
///
/// ```rust
/// use stateful_screens::core::{Extractor, State};
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Phase {
///     Input,
///     Sending { phone: String },
/// }
///
/// impl State for Phase {
///     fn name(&self) -> &str {
///         match self {
///             Self::Input => "Input",
///             Self::Sending { .. } => "Sending",
///         }
///     }
/// }
///
/// let by_sending = Extractor::new(|s: &Phase| match s {
///     Phase::Sending { phone } => Some(phone.clone()),
///     _ => None,
/// });
///
/// assert_eq!(
///     by_sending.extract(&Phase::Sending { phone: "7999".into() }),
///     Some("7999".to_string())
/// );
/// assert_eq!(by_sending.extract(&Phase::Input), None);
/// ```
pub struct Extractor<S: State, P> {
    extract: Arc<dyn Fn(&S) -> Option<P> + Send + Sync>,
}

impl<S: State, P> Extractor<S, P> {
    /// Create an extractor from a pure function.
    pub fn new<F>(extract: F) -> Self
    where
        F: Fn(&S) -> Option<P> + Send + Sync + 'static,
    {
        Extractor {
            extract: Arc::new(extract),
        }
    }

    /// Extract the payload, or `None` if the state does not match.
    pub fn extract(&self, state: &S) -> Option<P> {
        (self.extract)(state)
    }
}

impl<S: State, P> Clone for Extractor<S, P> {
    fn clone(&self) -> Self {
        Self {
            extract: Arc::clone(&self.extract),
        }
    }
}

impl<S: State, P> fmt::Debug for Extractor<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor").finish_non_exhaustive()
    }
}
