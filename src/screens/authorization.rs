//! Phone number entry.
//!
//! The user types a phone number and asks for an SMS code. Once the code is
//! sent, the code validator is presented; closing it returns the screen to
//! input, a successful authorization closes this screen too.

use crate::config::ScreensConfig;
use crate::core::{Extractor, Guard};
use crate::effects::{bridge, Request};
use crate::format::{cap, digits_only, format_phone};
use crate::navigation::{with_live, AuthorizationRouting, ScreenId, ValidatorListener};
use crate::presentation::{loading_indicator_driver, ErrorMessageViewModel};
use crate::reactive::{
    field, merge_fields, DataModelStore, DisposeBag, Driver, EventRelay, GuardedExt, ReadOnly,
    ReadOnlyState, ScreenLoop, Signal, StateStore,
};
use crate::screen_state;
use crate::services::{AuthorizationProfileProvider, ServiceError};
use crate::transitions;
use std::sync::{Arc, Weak};

#[derive(Clone, Debug, PartialEq)]
pub enum AuthorizationState {
    UserInput,
    SendingSmsRequest { phone_number: String },
    SmsRequestError { error: ServiceError, phone_number: String },
    /// The code validator is on screen.
    RoutedToCodeCheck { code: String },
}

screen_state! {
    AuthorizationState { UserInput, SendingSmsRequest, SmsRequestError, RoutedToCodeCheck }
    loading: [SendingSmsRequest]
    data_loaded: [RoutedToCodeCheck]
    loading_error: [SmsRequestError]
    final: [RoutedToCodeCheck]
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationScreenDataModel {
    /// Digits only, at most `phone_digits` of them.
    pub phone_number: String,
}

/// Raw events produced by the view.
#[derive(Clone, Debug, Default)]
pub struct AuthorizationViewOutput {
    pub get_sms_tap: EventRelay<()>,
    pub phone_number_text_change: EventRelay<String>,
    pub retry_tap: EventRelay<()>,
}

#[derive(Clone, Debug)]
pub struct AuthorizationInteractorOutput {
    pub state: ReadOnlyState<AuthorizationState>,
    pub screen_data_model: ReadOnly<AuthorizationScreenDataModel>,
}

#[derive(Debug, Default)]
struct Responses {
    did_receive_sms: EventRelay<String>,
    authorization_error: EventRelay<ServiceError>,
}

/// Events reported by the code validator presented from this screen.
#[derive(Debug, Default)]
struct ExternalEvents {
    success_auth: EventRelay<()>,
    closed_validator_view: EventRelay<()>,
}

impl ValidatorListener for ExternalEvents {
    fn success_auth(&self) {
        self.success_auth.accept(());
    }

    fn closed_validator_view(&self) {
        self.closed_validator_view.accept(());
    }
}

struct Requests {
    receive_sms: Request<String>,
}

pub struct AuthorizationInteractor {
    id: ScreenId,
    provider: Arc<dyn AuthorizationProfileProvider>,
    router: Weak<dyn AuthorizationRouting>,
    config: Arc<ScreensConfig>,
    state: StateStore<AuthorizationState>,
    screen_data_model: DataModelStore<AuthorizationScreenDataModel>,
    responses: Responses,
    external_events: Arc<ExternalEvents>,
    dispose_bag: DisposeBag,
}

impl AuthorizationInteractor {
    pub fn new(
        provider: Arc<dyn AuthorizationProfileProvider>,
        router: Weak<dyn AuthorizationRouting>,
        config: Arc<ScreensConfig>,
    ) -> Self {
        Self {
            id: ScreenId::new(),
            provider,
            router,
            state: StateStore::with_history_limit(
                AuthorizationState::UserInput,
                config.history_limit,
            ),
            config,
            screen_data_model: DataModelStore::new(AuthorizationScreenDataModel::default()),
            responses: Responses::default(),
            external_events: Arc::new(ExternalEvents::default()),
            dispose_bag: DisposeBag::new(),
        }
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    /// Listener handle for the code validator presented by this screen.
    pub fn listener(&self) -> Weak<dyn ValidatorListener> {
        let listener: Arc<dyn ValidatorListener> = self.external_events.clone();
        Arc::downgrade(&listener)
    }

    /// Wire the view events to the state machine and start the screen.
    ///
    /// Call once, from within a tokio runtime.
    pub fn transform(&self, view: &AuthorizationViewOutput) -> AuthorizationInteractorOutput {
        let requests = self.make_requests();
        let model = self.screen_data_model.read_only();
        let phone_digits = self.config.phone_digits;

        let by_user_input =
            Guard::new(|s: &AuthorizationState| matches!(s, AuthorizationState::UserInput));
        let by_sending = Guard::new(|s: &AuthorizationState| {
            matches!(s, AuthorizationState::SendingSmsRequest { .. })
        });
        let by_sending_phone = Extractor::new(|s: &AuthorizationState| match s {
            AuthorizationState::SendingSmsRequest { phone_number } => Some(phone_number.clone()),
            _ => None,
        });
        let by_error_phone = Extractor::new(|s: &AuthorizationState| match s {
            AuthorizationState::SmsRequestError { phone_number, .. } => Some(phone_number.clone()),
            _ => None,
        });
        let by_code_check = Guard::new(|s: &AuthorizationState| {
            matches!(s, AuthorizationState::RoutedToCodeCheck { .. })
        });

        let receive_sms = requests.receive_sms.clone();
        let retry_sms = requests.receive_sms;
        let validator_router = self.router.clone();
        let close_router = self.router.clone();

        let state_transitions = transitions![
            view.get_sms_tap
                .subscribe()
                .guarded_by(by_user_input)
                .with_latest(model.clone())
                .map(|((), model)| model.phone_number)
                .effect(move |phone| receive_sms.fire(phone.clone()))
                .to_state(|phone_number| AuthorizationState::SendingSmsRequest { phone_number }),
            self.responses
                .authorization_error
                .subscribe()
                .filter_mapped_by(by_sending_phone)
                .to_state(|(error, phone_number)| AuthorizationState::SmsRequestError {
                    error,
                    phone_number
                }),
            view.retry_tap
                .subscribe()
                .filter_mapped_by(by_error_phone)
                .map(|((), phone_number)| phone_number)
                .effect(move |phone| retry_sms.fire(phone.clone()))
                .to_state(|phone_number| AuthorizationState::SendingSmsRequest { phone_number }),
            self.responses
                .did_receive_sms
                .subscribe()
                .guarded_by(by_sending)
                .with_latest(model)
                .effect(move |(_, model)| {
                    let formatted = format_phone(&model.phone_number);
                    with_live(&validator_router, "route_to_validator", |router| {
                        router.route_to_validator(formatted)
                    });
                })
                .to_state(|(code, _)| AuthorizationState::RoutedToCodeCheck { code }),
            self.external_events
                .closed_validator_view
                .subscribe()
                .guarded_by(by_code_check)
                .to_state(|()| AuthorizationState::UserInput),
            self.external_events
                .success_auth
                .subscribe()
                .guarded_by(Guard::always())
                .route(move |()| with_live(&close_router, "close", |router| router.close())),
        ];

        let updates = merge_fields(vec![field(
            view.phone_number_text_change.subscribe(),
            move |model: &AuthorizationScreenDataModel, text: String| AuthorizationScreenDataModel {
                phone_number: cap(&digits_only(&text), phone_digits),
                ..model.clone()
            },
        )]);

        ScreenLoop {
            kind: "authorization",
            id: self.id,
            state: self.state.clone(),
            transitions: state_transitions,
            model: self.screen_data_model.clone(),
            updates,
        }
        .spawn(&self.dispose_bag);

        AuthorizationInteractorOutput {
            state: self.state.read_only(),
            screen_data_model: self.screen_data_model.read_only(),
        }
    }

    fn make_requests(&self) -> Requests {
        let provider = Arc::clone(&self.provider);
        Requests {
            receive_sms: bridge(
                "check_number",
                move |phone: String| {
                    let provider = Arc::clone(&provider);
                    async move { provider.check_number(&phone).await }
                },
                self.responses.did_receive_sms.clone(),
                self.responses.authorization_error.clone(),
            ),
        }
    }
}

/// View-facing outputs of the authorization screen.
#[derive(Clone, Debug)]
pub struct AuthorizationPresenterOutput {
    /// The SMS code just received, for display in a notification.
    pub show_code: Signal<String>,
    pub loading_indicator_visible: Driver<bool>,
    /// Formatted phone number.
    pub phone_number: Driver<String>,
    pub is_button_enabled: Driver<bool>,
    pub show_error: Signal<Option<ErrorMessageViewModel>>,
}

#[derive(Clone, Debug)]
pub struct AuthorizationPresenter {
    config: Arc<ScreensConfig>,
}

impl AuthorizationPresenter {
    pub fn new(config: Arc<ScreensConfig>) -> Self {
        Self { config }
    }

    pub fn transform(&self, input: &AuthorizationInteractorOutput) -> AuthorizationPresenterOutput {
        let show_code = input
            .state
            .signal()
            .filter_map(|state| match state {
                AuthorizationState::RoutedToCodeCheck { code } => Some(code),
                _ => None,
            })
            .distinct();

        let retry_title = self.config.retry_button_title.clone();
        let show_error = input.state.signal().map(move |state| match state {
            AuthorizationState::SmsRequestError { error, .. } => {
                Some(ErrorMessageViewModel::for_error(&error, &retry_title))
            }
            AuthorizationState::UserInput
            | AuthorizationState::SendingSmsRequest { .. }
            | AuthorizationState::RoutedToCodeCheck { .. } => None,
        });

        let phone_number = input
            .screen_data_model
            .driver()
            .map(|model| format_phone(&model.phone_number));

        let phone_digits = self.config.phone_digits;
        let is_button_enabled = input
            .screen_data_model
            .driver()
            .map(move |model| model.phone_number.len() == phone_digits)
            .distinct();

        AuthorizationPresenterOutput {
            show_code,
            loading_indicator_visible: loading_indicator_driver(&input.state),
            phone_number,
            is_button_enabled,
            show_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::State;
    use crate::services::{Call, ScriptedProvider};
    use crate::test_support::{ready, settle, RecordingRouter, Route};

    struct Screen {
        provider: Arc<ScriptedProvider>,
        router: Arc<RecordingRouter>,
        view: AuthorizationViewOutput,
        interactor: AuthorizationInteractor,
        output: AuthorizationInteractorOutput,
    }

    fn screen() -> Screen {
        let provider = Arc::new(ScriptedProvider::default());
        let router = Arc::new(RecordingRouter::default());
        let routing: Arc<dyn AuthorizationRouting> = router.clone();
        let interactor = AuthorizationInteractor::new(
            provider.clone(),
            Arc::downgrade(&routing),
            Arc::new(ScreensConfig::default()),
        );
        let view = AuthorizationViewOutput::default();
        let output = interactor.transform(&view);
        Screen {
            provider,
            router,
            view,
            interactor,
            output,
        }
    }

    async fn type_and_tap(screen: &Screen, phone: &str) {
        screen.view.phone_number_text_change.accept(phone.to_string());
        screen.view.get_sms_tap.accept(());
        settle().await;
    }

    #[tokio::test]
    async fn phone_input_is_refined() {
        let s = screen();

        s.view
            .phone_number_text_change
            .accept("+7 (999) 123-45-67 89".to_string());
        settle().await;

        assert_eq!(s.output.screen_data_model.current().phone_number, "79991234567");
    }

    #[tokio::test]
    async fn tap_sends_sms_request_once() {
        let s = screen();

        type_and_tap(&s, "9991234567").await;

        assert_eq!(
            s.output.state.current(),
            AuthorizationState::SendingSmsRequest {
                phone_number: "9991234567".to_string()
            }
        );
        assert_eq!(s.provider.calls(), vec![Call::CheckNumber("9991234567".to_string())]);
    }

    #[tokio::test]
    async fn second_tap_while_sending_is_dropped() {
        let s = screen();

        type_and_tap(&s, "79991234567").await;
        s.view.get_sms_tap.accept(());
        settle().await;

        assert_eq!(s.provider.count(|c| matches!(c, Call::CheckNumber(_))), 1);
    }

    #[tokio::test]
    async fn received_code_routes_to_validator_with_formatted_phone() {
        let s = screen();
        s.provider.check_number.push(Ok("12345".to_string()));

        type_and_tap(&s, "79991234567").await;

        assert_eq!(
            s.output.state.current(),
            AuthorizationState::RoutedToCodeCheck {
                code: "12345".to_string()
            }
        );
        assert_eq!(
            s.router.routes(),
            vec![Route::Validator("+7 999 123 45 67".to_string())]
        );
    }

    #[tokio::test]
    async fn validator_events_close_the_cycle() {
        let s = screen();
        s.provider.check_number.push(Ok("12345".to_string()));
        type_and_tap(&s, "79991234567").await;

        let listener = s.interactor.listener();
        listener.upgrade().unwrap().closed_validator_view();
        settle().await;
        assert_eq!(s.output.state.current(), AuthorizationState::UserInput);

        listener.upgrade().unwrap().success_auth();
        settle().await;
        assert_eq!(s.router.routes().last(), Some(&Route::Close));
        assert_eq!(s.output.state.current(), AuthorizationState::UserInput);
    }

    #[tokio::test]
    async fn stale_sms_response_after_error_is_dropped() {
        let s = screen();
        let late = s.provider.check_number.defer();
        type_and_tap(&s, "79991234567").await;

        s.interactor.responses.authorization_error.accept(ServiceError::Network);
        settle().await;
        late.send(Ok("99999".to_string())).unwrap();
        settle().await;

        assert!(s.output.state.current().is_loading_error());
        assert!(s.router.routes().is_empty());
    }

    #[tokio::test]
    async fn presenter_projects_phone_and_button() {
        let s = screen();
        let presenter = AuthorizationPresenter::new(Arc::new(ScreensConfig::default()));
        let out = presenter.transform(&s.output);
        let mut phone = out.phone_number.subscribe();
        let mut enabled = out.is_button_enabled.subscribe();

        s.view.phone_number_text_change.accept("7999".to_string());
        settle().await;
        s.view.phone_number_text_change.accept("79991234567".to_string());
        settle().await;

        assert_eq!(
            ready(&mut phone),
            vec!["+7".to_string(), "+7 999".to_string(), "+7 999 123 45 67".to_string()]
        );
        assert_eq!(ready(&mut enabled), vec![false, true]);
    }

    #[tokio::test]
    async fn presenter_shows_error_with_retry_title() {
        let s = screen();
        let presenter = AuthorizationPresenter::new(Arc::new(ScreensConfig::default()));
        let out = presenter.transform(&s.output);
        let mut errors = out.show_error.subscribe();
        let mut loading = out.loading_indicator_visible.subscribe();
        s.provider.check_number.push(Err(ServiceError::Network));

        type_and_tap(&s, "79991234567").await;

        assert_eq!(
            ready(&mut errors),
            vec![
                None,
                Some(ErrorMessageViewModel {
                    title: "The internet connection appears to be offline".to_string(),
                    button_title: "Retry".to_string(),
                })
            ]
        );
        assert_eq!(ready(&mut loading), vec![false, true, false]);
    }
}
