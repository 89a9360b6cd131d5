//! End-to-end screen scenarios driven through the public API.

use parking_lot::Mutex;
use stateful_screens::core::State;
use stateful_screens::navigation::{
    AuthorizationRouting, ProfileEditorRouting, ProfileRouting, ValidatorListener,
};
use stateful_screens::screens::authorization::{
    AuthorizationInteractor, AuthorizationState, AuthorizationViewOutput,
};
use stateful_screens::screens::profile::{ProfileInteractor, ProfileState, ProfileViewOutput};
use stateful_screens::screens::profile_editor::{
    ProfileEditorInteractor, ProfileEditorState, ProfileEditorViewOutput,
};
use stateful_screens::screens::validator::{
    ValidatorInteractor, ValidatorState, ValidatorViewOutput,
};
use stateful_screens::services::{
    AuthError, Call, InMemoryProvider, Profile, ScriptedProvider, ServiceError, SimulationConfig,
};
use stateful_screens::ScreensConfig;
use std::sync::Arc;
use std::time::Duration;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}

#[derive(Default)]
struct Navigator {
    log: Mutex<Vec<String>>,
    edited: Mutex<Option<Profile>>,
}

impl Navigator {
    fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn push(&self, entry: impl Into<String>) {
        self.log.lock().push(entry.into());
    }
}

impl AuthorizationRouting for Navigator {
    fn route_to_validator(&self, phone_number: String) {
        self.push(format!("validator {phone_number}"));
    }

    fn close(&self) {
        self.push("close authorization");
    }
}

impl ProfileRouting for Navigator {
    fn route_to_edit(&self, profile: Profile) {
        self.push("edit");
        *self.edited.lock() = Some(profile);
    }
}

impl ProfileEditorRouting for Navigator {
    fn close(&self) {
        self.push("close editor");
    }
}

impl ValidatorListener for Navigator {
    fn success_auth(&self) {
        self.push("success auth");
    }

    fn closed_validator_view(&self) {
        self.push("closed validator");
    }
}

fn config() -> Arc<ScreensConfig> {
    Arc::new(ScreensConfig::default())
}

#[tokio::test]
async fn authorization_recovers_after_failed_sms_request() {
    let provider = Arc::new(ScriptedProvider::default());
    let navigator = Arc::new(Navigator::default());
    let routing: Arc<dyn AuthorizationRouting> = navigator.clone();
    let interactor = AuthorizationInteractor::new(provider.clone(), Arc::downgrade(&routing), config());
    let view = AuthorizationViewOutput::default();
    let output = interactor.transform(&view);

    provider.check_number.push(Err(ServiceError::Network));
    provider.check_number.push(Ok("54321".to_string()));

    view.phone_number_text_change.accept("79991234567".to_string());
    view.get_sms_tap.accept(());
    settle().await;
    assert_eq!(
        output.state.current(),
        AuthorizationState::SmsRequestError {
            error: ServiceError::Network,
            phone_number: "79991234567".to_string()
        }
    );

    view.retry_tap.accept(());
    view.retry_tap.accept(());
    settle().await;

    assert_eq!(
        output.state.current(),
        AuthorizationState::RoutedToCodeCheck {
            code: "54321".to_string()
        }
    );
    assert_eq!(provider.count(|c| matches!(c, Call::CheckNumber(_))), 2);
    assert_eq!(navigator.log(), vec!["validator +7 999 123 45 67"]);
}

#[tokio::test]
async fn validator_retries_profile_update_forever() {
    const FAILURES: usize = 6;

    let provider = Arc::new(ScriptedProvider::default());
    let navigator = Arc::new(Navigator::default());
    let listener: Arc<dyn ValidatorListener> = navigator.clone();
    let interactor = ValidatorInteractor::new(
        provider.clone(),
        "+7 999 123 45 67",
        Arc::downgrade(&listener),
        config(),
    );
    let view = ValidatorViewOutput::default();
    let output = interactor.transform(&view);

    provider.check_code.push(Ok(()));
    for _ in 0..FAILURES {
        provider.update_phone_number.push(Err(ServiceError::BadNetwork));
    }
    let last = provider.update_phone_number.defer();

    view.code_text_change.accept("12345".to_string());
    settle().await;

    assert_eq!(output.state.current(), ValidatorState::UpdatingProfile);
    assert!(!output.state.current().is_loading_error());
    assert_eq!(
        provider.count(|c| matches!(c, Call::UpdatePhoneNumber(_))),
        FAILURES + 1
    );
    assert_eq!(
        output.state.history().last().map(|t| t.attempt),
        Some(FAILURES + 1)
    );

    last.send(Ok(())).unwrap();
    settle().await;
    assert_eq!(output.state.current(), ValidatorState::UpdatedProfile);
    assert_eq!(navigator.log(), vec!["success auth"]);
}

#[tokio::test]
async fn wrong_code_can_be_corrected() {
    let provider = Arc::new(ScriptedProvider::default());
    let navigator = Arc::new(Navigator::default());
    let listener: Arc<dyn ValidatorListener> = navigator.clone();
    let interactor = ValidatorInteractor::new(
        provider.clone(),
        "+7 999 123 45 67",
        Arc::downgrade(&listener),
        config(),
    );
    let view = ValidatorViewOutput::default();
    let output = interactor.transform(&view);

    provider.check_code.push(Err(AuthError::Validation));
    provider.check_code.push(Ok(()));
    provider.update_phone_number.push(Ok(()));

    view.code_text_change.accept("00000".to_string());
    settle().await;
    assert!(output.state.current().is_loading_error());

    view.code_text_change.accept("1234".to_string());
    view.code_text_change.accept("12345".to_string());
    settle().await;

    assert_eq!(output.state.current(), ValidatorState::UpdatedProfile);
    assert_eq!(
        provider.calls(),
        vec![
            Call::CheckCode("00000".to_string()),
            Call::CheckCode("12345".to_string()),
            Call::UpdatePhoneNumber("+7 999 123 45 67".to_string()),
        ]
    );
}

#[tokio::test]
async fn profile_first_load_fails_then_retry_succeeds() {
    let provider = Arc::new(InMemoryProvider::new(SimulationConfig {
        latency_ms: 0,
        ..SimulationConfig::default()
    }));
    let navigator = Arc::new(Navigator::default());
    let routing: Arc<dyn ProfileRouting> = navigator.clone();
    let interactor = ProfileInteractor::new(provider.clone(), Arc::downgrade(&routing));
    let view = ProfileViewOutput::default();
    let state = interactor.transform(&view);

    interactor.activate();
    settle().await;
    assert_eq!(
        state.current(),
        ProfileState::LoadingError {
            error: ServiceError::BadNetwork
        }
    );

    view.retry_tap.accept(());
    settle().await;
    assert_eq!(
        state.current(),
        ProfileState::DataLoaded {
            profile: provider.current_profile()
        }
    );
    let history = state.history();
    let names: Vec<&str> = history.get_path().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["IsLoading", "LoadingError", "IsLoading", "DataLoaded"]);
}

#[tokio::test]
async fn full_flow_from_phone_to_edited_profile() {
    let provider = Arc::new(InMemoryProvider::new(SimulationConfig {
        latency_ms: 0,
        ..SimulationConfig::default()
    }));
    let navigator = Arc::new(Navigator::default());

    // authorization
    let auth_routing: Arc<dyn AuthorizationRouting> = navigator.clone();
    let authorization =
        AuthorizationInteractor::new(provider.clone(), Arc::downgrade(&auth_routing), config());
    let auth_view = AuthorizationViewOutput::default();
    let auth_output = authorization.transform(&auth_view);
    auth_view.phone_number_text_change.accept("79991112233".to_string());
    auth_view.get_sms_tap.accept(());
    settle().await;
    assert!(matches!(
        auth_output.state.current(),
        AuthorizationState::RoutedToCodeCheck { .. }
    ));

    // code check, reporting back to the authorization screen
    let validator = ValidatorInteractor::new(
        provider.clone(),
        "+7 999 111 22 33",
        authorization.listener(),
        config(),
    );
    let validator_view = ValidatorViewOutput::default();
    let validator_output = validator.transform(&validator_view);
    let code = provider.last_sms_code().unwrap_or_default();
    validator_view.code_text_change.accept(code);
    settle().await;
    assert_eq!(validator_output.state.current(), ValidatorState::UpdatedProfile);
    assert_eq!(
        navigator.log(),
        vec!["validator +7 999 111 22 33", "close authorization"]
    );

    // profile, already authorized
    let profile_routing: Arc<dyn ProfileRouting> = navigator.clone();
    let profile = ProfileInteractor::new(provider.clone(), Arc::downgrade(&profile_routing));
    let profile_view = ProfileViewOutput::default();
    let profile_state = profile.transform(&profile_view);
    profile.activate();
    settle().await;
    profile_view.retry_tap.accept(());
    settle().await;
    profile_view.edit_profile_tap.accept(());
    settle().await;

    let edited = navigator.edited.lock().clone();
    let Some(edited) = edited else {
        panic!("profile editor was not opened");
    };
    assert!(edited.authorized);
    assert_eq!(edited.phone, "+7 999 111 22 33");

    // editor, whose update shows up on the profile screen
    let editor_routing: Arc<dyn ProfileEditorRouting> = navigator.clone();
    let editor =
        ProfileEditorInteractor::new(provider.clone(), &edited, Arc::downgrade(&editor_routing));
    let editor_view = ProfileEditorViewOutput::default();
    let editor_output = editor.transform(&editor_view);
    editor_view.first_name_text_change.accept("Ann".to_string());
    editor_view.email_text_change.accept("ann@mail.com".to_string());
    editor_view.update_profile_tap.accept(());
    settle().await;
    assert_eq!(editor_output.state.current(), ProfileEditorState::RoutedToProfile);
    editor_view.alert_button_tap.accept(());
    settle().await;

    match profile_state.current() {
        ProfileState::DataLoaded { profile } => {
            assert_eq!(profile.first_name.as_deref(), Some("Ann"));
            assert_eq!(profile.email.as_deref(), Some("ann@mail.com"));
        }
        other => panic!("unexpected profile state: {other:?}"),
    }
    assert_eq!(navigator.log().last().map(String::as_str), Some("close editor"));
}
