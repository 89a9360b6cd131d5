//! Macros for declaring screen state machines.

/// Implement [`State`](crate::core::State) for a screen state enum.
///
/// Variants may carry payloads; only their names are listed. Each
/// classification list is optional and defaults to empty.
///
/// # Example
///
/// ```
/// use stateful_screens::core::State;
/// use stateful_screens::screen_state;
///
/// #[derive(Clone, PartialEq, Debug)]
/// pub enum FetchState {
///     Idle,
///     Fetching { url: String },
///     Fetched(Vec<u8>),
///     Failed { reason: String },
/// }
///
/// screen_state! {
///     FetchState { Idle, Fetching, Fetched, Failed }
///     loading: [Fetching]
///     data_loaded: [Fetched]
///     loading_error: [Failed]
/// }
///
/// let state = FetchState::Fetching { url: "/".into() };
/// assert_eq!(state.name(), "Fetching");
/// assert!(state.should_loading_indicator_be_visible());
/// ```
#[macro_export]
macro_rules! screen_state {
    (
        $name:ident { $($variant:ident),* $(,)? }

        $(loading: [$($loading:ident),* $(,)?])?
        $(data_loaded: [$($loaded:ident),* $(,)?])?
        $(loading_error: [$($error:ident),* $(,)?])?
        $(final: [$($final:ident),* $(,)?])?
    ) => {
        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant { .. } => stringify!($variant)),*
                }
            }

            fn is_loading(&self) -> bool {
                match self {
                    $($(Self::$loading { .. } => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            fn is_data_loaded(&self) -> bool {
                match self {
                    $($(Self::$loaded { .. } => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            fn is_loading_error(&self) -> bool {
                match self {
                    $($(Self::$error { .. } => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final { .. } => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}

/// Merge transition sources; sugar for [`transitions`](crate::reactive::transitions).
///
/// ```ignore
/// let merged = transitions![
///     taps.guarded_by(by_input()).to_state(|_| State::Sending),
///     errors.guarded_by(by_sending()).to_state(State::Failed),
/// ];
/// ```
#[macro_export]
macro_rules! transitions {
    ($($source:expr),* $(,)?) => {
        $crate::reactive::transitions(vec![$($source),*])
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Guard, State};
    use crate::reactive::{EventRelay, GuardedExt, StateStore};
    use crate::test_support::settle;

    #[derive(Clone, PartialEq, Debug)]
    enum TestState {
        Input,
        Sending { phone: String },
        Failed(String),
        Done,
    }

    screen_state! {
        TestState { Input, Sending, Failed, Done }
        loading: [Sending]
        loading_error: [Failed]
        final: [Done]
    }

    #[derive(Clone, PartialEq, Debug)]
    enum MinimalState {
        One,
        Two,
    }

    screen_state! {
        MinimalState { One, Two }
    }

    #[test]
    fn screen_state_names_ignore_payloads() {
        assert_eq!(TestState::Input.name(), "Input");
        assert_eq!(
            TestState::Sending {
                phone: "1".to_string()
            }
            .name(),
            "Sending"
        );
        assert_eq!(TestState::Failed("x".to_string()).name(), "Failed");
    }

    #[test]
    fn screen_state_classifies_variants() {
        let sending = TestState::Sending {
            phone: String::new(),
        };
        assert!(sending.is_loading());
        assert!(sending.should_loading_indicator_be_visible());
        assert!(!sending.is_final());

        assert!(TestState::Failed(String::new()).is_loading_error());
        assert!(TestState::Done.is_final());
        assert!(!TestState::Input.is_data_loaded());
    }

    #[test]
    fn screen_state_works_without_classifications() {
        assert_eq!(MinimalState::Two.name(), "Two");
        assert!(!MinimalState::One.is_loading());
        assert!(!MinimalState::One.is_final());
    }

    #[tokio::test]
    async fn transitions_macro_merges_sources() {
        let taps = EventRelay::new();
        let store = StateStore::new(TestState::Input);
        let merged = transitions![
            taps.subscribe()
                .guarded_by(Guard::new(|s: &TestState| matches!(s, TestState::Input)))
                .to_state(|phone: String| TestState::Sending { phone }),
        ];
        tokio::spawn(merged.bind(store.clone()));

        taps.accept("7999".to_string());
        settle().await;

        assert_eq!(
            store.current(),
            TestState::Sending {
                phone: "7999".to_string()
            }
        );
    }
}
