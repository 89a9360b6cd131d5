//! SMS code check.
//!
//! The code is submitted automatically once fully typed. A correct code
//! updates the profile's phone number; profile update failures are retried
//! until one succeeds, after which the listener is told the user is
//! authorized.

use crate::config::ScreensConfig;
use crate::core::{Guard, State};
use crate::effects::{bridge, Request};
use crate::format::{cap, digits_only};
use crate::navigation::{with_live, ScreenId, ValidatorListener};
use crate::presentation::loading_indicator_driver;
use crate::reactive::{
    field, merge_fields, DataModelStore, DisposeBag, Driver, EventRelay, GuardedExt, ReadOnly,
    ReadOnlyState, ScreenLoop, Signal, StateStore,
};
use crate::services::{AuthError, AuthorizationProfileProvider, ServiceError};
use crate::transitions;
use futures::future;
use futures::stream::StreamExt;
use std::sync::{Arc, Weak};

#[derive(Clone, Debug, PartialEq)]
pub enum ValidatorState {
    /// Waiting for the code; carries the failure of the previous check.
    UserInput { error: Option<AuthError> },
    SendingCodeCheck,
    UpdatingProfile,
    UpdatedProfile,
}

impl State for ValidatorState {
    fn name(&self) -> &str {
        match self {
            Self::UserInput { .. } => "UserInput",
            Self::SendingCodeCheck => "SendingCodeCheck",
            Self::UpdatingProfile => "UpdatingProfile",
            Self::UpdatedProfile => "UpdatedProfile",
        }
    }

    fn is_loading(&self) -> bool {
        matches!(self, Self::SendingCodeCheck | Self::UpdatingProfile)
    }

    fn is_data_loaded(&self) -> bool {
        matches!(self, Self::UpdatedProfile)
    }

    fn is_loading_error(&self) -> bool {
        matches!(self, Self::UserInput { error: Some(_) })
    }

    fn is_final(&self) -> bool {
        matches!(self, Self::UpdatedProfile)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatorScreenDataModel {
    pub code: String,
}

#[derive(Clone, Debug, Default)]
pub struct ValidatorViewOutput {
    pub code_text_change: EventRelay<String>,
    pub view_did_disappear: EventRelay<()>,
}

#[derive(Clone, Debug)]
pub struct ValidatorInteractorOutput {
    pub state: ReadOnlyState<ValidatorState>,
    pub screen_data_model: ReadOnly<ValidatorScreenDataModel>,
}

#[derive(Debug, Default)]
struct Responses {
    correct_code: EventRelay<()>,
    code_error: EventRelay<AuthError>,
    updated_profile: EventRelay<()>,
    updating_error: EventRelay<ServiceError>,
}

struct Requests {
    check_code: Request<String>,
    update_phone_number: Request<String>,
}

pub struct ValidatorInteractor {
    id: ScreenId,
    provider: Arc<dyn AuthorizationProfileProvider>,
    phone_number: String,
    listener: Weak<dyn ValidatorListener>,
    config: Arc<ScreensConfig>,
    state: StateStore<ValidatorState>,
    screen_data_model: DataModelStore<ValidatorScreenDataModel>,
    responses: Responses,
    dispose_bag: DisposeBag,
}

impl ValidatorInteractor {
    /// Validator confirming `phone_number`, the formatted number the code
    /// was sent to.
    pub fn new(
        provider: Arc<dyn AuthorizationProfileProvider>,
        phone_number: impl Into<String>,
        listener: Weak<dyn ValidatorListener>,
        config: Arc<ScreensConfig>,
    ) -> Self {
        Self {
            id: ScreenId::new(),
            provider,
            phone_number: phone_number.into(),
            listener,
            state: StateStore::with_history_limit(
                ValidatorState::UserInput { error: None },
                config.history_limit,
            ),
            config,
            screen_data_model: DataModelStore::new(ValidatorScreenDataModel::default()),
            responses: Responses::default(),
            dispose_bag: DisposeBag::new(),
        }
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    /// Wire the view events to the state machine and start the screen.
    ///
    /// Call once, from within a tokio runtime.
    pub fn transform(&self, view: &ValidatorViewOutput) -> ValidatorInteractorOutput {
        let requests = self.make_requests();
        let code_length = self.config.sms_code_length;
        let refine = move |text: &str| cap(&digits_only(text), code_length);

        let by_user_input =
            Guard::new(|s: &ValidatorState| matches!(s, ValidatorState::UserInput { .. }));
        let by_sending_code_check =
            || Guard::new(|s: &ValidatorState| matches!(s, ValidatorState::SendingCodeCheck));
        let by_updating_profile =
            || Guard::new(|s: &ValidatorState| matches!(s, ValidatorState::UpdatingProfile));

        let check_code = requests.check_code;
        let update = requests.update_phone_number.clone();
        let retry_update = requests.update_phone_number;
        let phone_number = self.phone_number.clone();
        let retry_phone_number = self.phone_number.clone();
        let success_listener = self.listener.clone();
        let close_listener = self.listener.clone();

        let full_codes = view
            .code_text_change
            .subscribe()
            .map(move |text| refine(&text))
            .filter(move |code| future::ready(code.chars().count() == code_length));

        let state_transitions = transitions![
            full_codes
                .guarded_by(by_user_input)
                .effect(move |code| check_code.fire(code.clone()))
                .to_state(|_| ValidatorState::SendingCodeCheck),
            self.responses
                .code_error
                .subscribe()
                .guarded_by(by_sending_code_check())
                .to_state(|error| ValidatorState::UserInput { error: Some(error) }),
            self.responses
                .correct_code
                .subscribe()
                .guarded_by(by_sending_code_check())
                .effect(move |()| update.fire(phone_number.clone()))
                .to_state(|()| ValidatorState::UpdatingProfile),
            // no cap: the update is retried until it succeeds
            self.responses
                .updating_error
                .subscribe()
                .guarded_by(by_updating_profile())
                .effect(move |_| retry_update.fire(retry_phone_number.clone()))
                .to_state(|_| ValidatorState::UpdatingProfile),
            self.responses
                .updated_profile
                .subscribe()
                .guarded_by(by_updating_profile())
                .effect(move |()| {
                    with_live(&success_listener, "success_auth", |listener| {
                        listener.success_auth()
                    })
                })
                .to_state(|()| ValidatorState::UpdatedProfile),
            view.view_did_disappear
                .subscribe()
                .guarded_by(Guard::always())
                .route(move |()| {
                    with_live(&close_listener, "closed_validator_view", |listener| {
                        listener.closed_validator_view()
                    })
                }),
        ];

        let updates = merge_fields(vec![field(
            view.code_text_change.subscribe(),
            move |model: &ValidatorScreenDataModel, text: String| ValidatorScreenDataModel {
                code: refine(&text),
                ..model.clone()
            },
        )]);

        ScreenLoop {
            kind: "validator",
            id: self.id,
            state: self.state.clone(),
            transitions: state_transitions,
            model: self.screen_data_model.clone(),
            updates,
        }
        .spawn(&self.dispose_bag);

        ValidatorInteractorOutput {
            state: self.state.read_only(),
            screen_data_model: self.screen_data_model.read_only(),
        }
    }

    fn make_requests(&self) -> Requests {
        let check = Arc::clone(&self.provider);
        let update = Arc::clone(&self.provider);
        Requests {
            check_code: bridge(
                "check_code",
                move |code: String| {
                    let provider = Arc::clone(&check);
                    async move { provider.check_code(&code).await }
                },
                self.responses.correct_code.clone(),
                self.responses.code_error.clone(),
            ),
            update_phone_number: bridge(
                "update_phone_number",
                move |phone_number: String| {
                    let provider = Arc::clone(&update);
                    async move { provider.update_phone_number(&phone_number).await }
                },
                self.responses.updated_profile.clone(),
                self.responses.updating_error.clone(),
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ValidatorPresenterOutput {
    pub show_number: Driver<String>,
    pub is_content_visible: Driver<bool>,
    pub loading_indicator_visible: Driver<bool>,
    pub code: Driver<String>,
    pub show_network_error: Signal<Option<String>>,
    pub show_validation_error: Signal<Option<String>>,
}

#[derive(Clone, Debug)]
pub struct ValidatorPresenter {
    phone_number: String,
}

impl ValidatorPresenter {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
        }
    }

    pub fn transform(&self, input: &ValidatorInteractorOutput) -> ValidatorPresenterOutput {
        let is_content_visible = input
            .state
            .driver()
            .filter_map(|state| matches!(state, ValidatorState::UserInput { .. }).then_some(true))
            .start_with(false)
            .distinct();

        ValidatorPresenterOutput {
            show_number: Driver::just(self.phone_number.clone()),
            is_content_visible,
            loading_indicator_visible: loading_indicator_driver(&input.state),
            code: input.screen_data_model.driver().map(|model| model.code),
            show_network_error: error_message(&input.state, AuthError::is_network),
            show_validation_error: error_message(&input.state, AuthError::is_validation),
        }
    }
}

/// Description of the input error matching `kind`, `None` otherwise.
fn error_message(
    state: &ReadOnlyState<ValidatorState>,
    kind: fn(&AuthError) -> bool,
) -> Signal<Option<String>> {
    state
        .signal()
        .map(move |state| match state {
            ValidatorState::UserInput { error: Some(error) } if kind(&error) => {
                Some(error.to_string())
            }
            ValidatorState::UserInput { .. }
            | ValidatorState::SendingCodeCheck
            | ValidatorState::UpdatingProfile
            | ValidatorState::UpdatedProfile => None,
        })
        .distinct()
}
