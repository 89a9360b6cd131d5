//! Profile editing form.
//!
//! The user edits names and e-mail and submits. An invalid e-mail keeps the
//! form in input; a successful update leaves the screen in its final state
//! until the confirmation alert is dismissed.

use crate::config::ScreensConfig;
use crate::core::{Extractor, Guard};
use crate::effects::{bridge, Request};
use crate::format::{check_email, letters_only, strip_whitespace, EmailValidationError};
use crate::navigation::{with_live, ProfileEditorRouting, ScreenId};
use crate::presentation::{loading_indicator_driver, ErrorMessageViewModel};
use crate::reactive::{
    field, merge_fields, DataModelStore, DisposeBag, Driver, EventRelay, GuardedExt, ReadOnly,
    ReadOnlyState, ScreenLoop, Signal, StateStore,
};
use crate::screen_state;
use crate::services::{AuthorizationProfileProvider, Profile, ServiceError};
use crate::transitions;
use crate::validation::validate_profile_form;
use std::sync::{Arc, Weak};
use stillwater::validation::Validation;
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub enum ProfileEditorState {
    UserInput,
    UpdatingProfile { profile: Profile },
    UpdateProfileError { error: ServiceError, profile: Profile },
    RoutedToProfile,
}

screen_state! {
    ProfileEditorState { UserInput, UpdatingProfile, UpdateProfileError, RoutedToProfile }
    loading: [UpdatingProfile]
    data_loaded: [RoutedToProfile]
    loading_error: [UpdateProfileError]
    final: [RoutedToProfile]
}

/// Form contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileEditorScreenDataModel {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// Raw e-mail text as typed, whitespace removed.
    pub email_text: String,
    /// Result of checking `email_text`; `Ok(None)` for an empty field.
    pub email: Result<Option<String>, EmailValidationError>,
    /// Set by a submit with an invalid e-mail, cleared by every edit.
    pub email_error_visible: bool,
}

impl ProfileEditorScreenDataModel {
    pub fn new(profile: &Profile) -> Self {
        let email_text = profile.email.clone().unwrap_or_default();
        Self {
            first_name: profile.first_name.clone().unwrap_or_default(),
            last_name: profile.last_name.clone().unwrap_or_default(),
            phone: profile.phone.clone(),
            email: check_email(&email_text),
            email_text,
            email_error_visible: false,
        }
    }

    pub fn with_first_name(&self, text: &str) -> Self {
        Self {
            first_name: letters_only(text),
            email_error_visible: false,
            ..self.clone()
        }
    }

    pub fn with_last_name(&self, text: &str) -> Self {
        Self {
            last_name: letters_only(text),
            email_error_visible: false,
            ..self.clone()
        }
    }

    /// Replace the e-mail text and re-check it.
    pub fn with_email(&self, text: &str) -> Self {
        let email_text = strip_whitespace(text);
        Self {
            email: check_email(&email_text),
            email_text,
            email_error_visible: false,
            ..self.clone()
        }
    }

    /// The form as seen right after the user taps submit.
    pub fn submitted(&self) -> Self {
        Self {
            email_error_visible: self.email.is_err(),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProfileEditorViewOutput {
    pub update_profile_tap: EventRelay<()>,
    pub first_name_text_change: EventRelay<String>,
    pub last_name_text_change: EventRelay<String>,
    pub email_text_change: EventRelay<String>,
    pub retry_tap: EventRelay<()>,
    pub alert_button_tap: EventRelay<()>,
}

#[derive(Clone, Debug)]
pub struct ProfileEditorInteractorOutput {
    pub state: ReadOnlyState<ProfileEditorState>,
    pub screen_data_model: ReadOnly<ProfileEditorScreenDataModel>,
}

#[derive(Debug, Default)]
struct Responses {
    profile_updated: EventRelay<()>,
    update_error: EventRelay<ServiceError>,
}

struct Requests {
    update_profile: Request<Profile>,
}

pub struct ProfileEditorInteractor {
    id: ScreenId,
    provider: Arc<dyn AuthorizationProfileProvider>,
    router: Weak<dyn ProfileEditorRouting>,
    state: StateStore<ProfileEditorState>,
    screen_data_model: DataModelStore<ProfileEditorScreenDataModel>,
    responses: Responses,
    dispose_bag: DisposeBag,
}

impl ProfileEditorInteractor {
    /// Editor prefilled with `profile`.
    pub fn new(
        provider: Arc<dyn AuthorizationProfileProvider>,
        profile: &Profile,
        router: Weak<dyn ProfileEditorRouting>,
    ) -> Self {
        Self {
            id: ScreenId::new(),
            provider,
            router,
            state: StateStore::new(ProfileEditorState::UserInput),
            screen_data_model: DataModelStore::new(ProfileEditorScreenDataModel::new(profile)),
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
    pub fn transform(&self, view: &ProfileEditorViewOutput) -> ProfileEditorInteractorOutput {
        let requests = self.make_requests();
        let model = self.screen_data_model.read_only();

        let by_user_input =
            Guard::new(|s: &ProfileEditorState| matches!(s, ProfileEditorState::UserInput));
        let by_updating_profile = || {
            Extractor::new(|s: &ProfileEditorState| match s {
                ProfileEditorState::UpdatingProfile { profile } => Some(profile.clone()),
                _ => None,
            })
        };
        let by_error_profile = Extractor::new(|s: &ProfileEditorState| match s {
            ProfileEditorState::UpdateProfileError { profile, .. } => Some(profile.clone()),
            _ => None,
        });
        let by_routed_to_profile =
            Guard::new(|s: &ProfileEditorState| matches!(s, ProfileEditorState::RoutedToProfile));

        let submit = requests.update_profile.clone();
        let retry = requests.update_profile;
        let router = self.router.clone();
        let form = self.screen_data_model.clone();

        let state_transitions = transitions![
            view.update_profile_tap
                .subscribe()
                .guarded_by(by_user_input)
                .with_latest(model)
                .filter_map(|((), form)| match validate_profile_form(&form) {
                    Validation::Success(profile) => Some(profile),
                    Validation::Failure(errors) => {
                        debug!(errors = errors.len(), "profile form rejected");
                        None
                    }
                })
                .effect(move |profile| submit.fire(profile.clone()))
                .to_state(|profile| ProfileEditorState::UpdatingProfile { profile }),
            self.responses
                .update_error
                .subscribe()
                .filter_mapped_by(by_updating_profile())
                .to_state(|(error, profile)| ProfileEditorState::UpdateProfileError {
                    error,
                    profile
                }),
            view.retry_tap
                .subscribe()
                .filter_mapped_by(by_error_profile)
                .map(|((), profile)| profile)
                .effect(move |profile| retry.fire(profile.clone()))
                .to_state(|profile| ProfileEditorState::UpdatingProfile { profile }),
            self.responses
                .profile_updated
                .subscribe()
                .filter_mapped_by(by_updating_profile())
                .to_state(|_| ProfileEditorState::RoutedToProfile),
            view.alert_button_tap
                .subscribe()
                .guarded_by(by_routed_to_profile)
                .route(move |()| with_live(&router, "close", |router| router.close())),
            // applied here, after pending edits, so the check sees the latest e-mail
            view.update_profile_tap
                .subscribe()
                .guarded_by(Guard::<ProfileEditorState>::always())
                .route(move |()| form.apply(form.current().submitted())),
        ];

        let updates = merge_fields(vec![
            field(
                view.first_name_text_change.subscribe(),
                |model: &ProfileEditorScreenDataModel, text: String| model.with_first_name(&text),
            ),
            field(
                view.last_name_text_change.subscribe(),
                |model: &ProfileEditorScreenDataModel, text: String| model.with_last_name(&text),
            ),
            field(
                view.email_text_change.subscribe(),
                |model: &ProfileEditorScreenDataModel, text: String| model.with_email(&text),
            ),
        ]);

        ScreenLoop {
            kind: "profile_editor",
            id: self.id,
            state: self.state.clone(),
            transitions: state_transitions,
            model: self.screen_data_model.clone(),
            updates,
        }
        .spawn(&self.dispose_bag);

        ProfileEditorInteractorOutput {
            state: self.state.read_only(),
            screen_data_model: self.screen_data_model.read_only(),
        }
    }

    fn make_requests(&self) -> Requests {
        let provider = Arc::clone(&self.provider);
        Requests {
            update_profile: bridge(
                "update_profile",
                move |profile: Profile| {
                    let provider = Arc::clone(&provider);
                    async move { provider.update_profile(profile).await }
                },
                self.responses.profile_updated.clone(),
                self.responses.update_error.clone(),
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProfileEditorPresenterOutput {
    pub loading_indicator_visible: Driver<bool>,
    pub first_name: Driver<String>,
    pub last_name: Driver<String>,
    /// The e-mail, only while it is valid and not empty.
    pub email: Driver<String>,
    pub phone: Driver<String>,
    /// Cleared by every edit, set when submitting an invalid e-mail.
    pub email_validation_error: Signal<Option<String>>,
    pub profile_successfully_edited: Signal<bool>,
    pub show_error: Signal<Option<ErrorMessageViewModel>>,
}

#[derive(Clone, Debug)]
pub struct ProfileEditorPresenter {
    config: Arc<ScreensConfig>,
}

impl ProfileEditorPresenter {
    pub fn new(config: Arc<ScreensConfig>) -> Self {
        Self { config }
    }

    pub fn transform(&self, input: &ProfileEditorInteractorOutput) -> ProfileEditorPresenterOutput {
        let model = &input.screen_data_model;

        let email = model
            .driver()
            .filter_map(|model| model.email.ok().flatten())
            .distinct();

        let message = self.config.invalid_email_message.clone();
        let email_validation_error = model
            .signal()
            .map(move |model| model.email_error_visible.then(|| message.clone()));

        let profile_successfully_edited = input
            .state
            .signal()
            .filter_map(|state| matches!(state, ProfileEditorState::RoutedToProfile).then_some(true))
            .distinct();

        let retry_title = self.config.retry_button_title.clone();
        let show_error = input.state.signal().map(move |state| match state {
            ProfileEditorState::UpdateProfileError { error, .. } => {
                Some(ErrorMessageViewModel::for_error(&error, &retry_title))
            }
            ProfileEditorState::UserInput
            | ProfileEditorState::UpdatingProfile { .. }
            | ProfileEditorState::RoutedToProfile => None,
        });

        ProfileEditorPresenterOutput {
            loading_indicator_visible: loading_indicator_driver(&input.state),
            first_name: model.driver().map(|model| model.first_name).distinct(),
            last_name: model.driver().map(|model| model.last_name).distinct(),
            email,
            phone: model.driver().map(|model| model.phone).distinct(),
            email_validation_error,
            profile_successfully_edited,
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
        view: ProfileEditorViewOutput,
        output: ProfileEditorInteractorOutput,
        _interactor: ProfileEditorInteractor,
    }

    fn profile() -> Profile {
        Profile {
            first_name: Some("Ann".to_string()),
            last_name: Some("Lee".to_string()),
            email: None,
            phone: "+7 999 123 45 67".to_string(),
            authorized: true,
        }
    }

    fn screen() -> Screen {
        let provider = Arc::new(ScriptedProvider::default());
        let router = Arc::new(RecordingRouter::default());
        let routing: Arc<dyn ProfileEditorRouting> = router.clone();
        let interactor =
            ProfileEditorInteractor::new(provider.clone(), &profile(), Arc::downgrade(&routing));
        let view = ProfileEditorViewOutput::default();
        let output = interactor.transform(&view);
        Screen {
            provider,
            router,
            view,
            output,
            _interactor: interactor,
        }
    }

    #[test]
    fn data_model_refines_input() {
        let model = ProfileEditorScreenDataModel::new(&profile());
        assert_eq!(model.email, Ok(None));

        let model = model.with_first_name("Ann-Marie 2").with_email(" ann @mail.com ");
        assert_eq!(model.first_name, "AnnMarie");
        assert_eq!(model.email_text, "ann@mail.com");
        assert_eq!(model.email, Ok(Some("ann@mail.com".to_string())));

        let model = model.with_email("a@b@c");
        assert_eq!(model.email, Err(EmailValidationError));
    }

    #[tokio::test]
    async fn invalid_email_keeps_form_in_input() {
        let s = screen();

        s.view.email_text_change.accept("ann.mail.com".to_string());
        s.view.update_profile_tap.accept(());
        settle().await;

        assert_eq!(s.output.state.current(), ProfileEditorState::UserInput);
        assert!(s.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn submit_sends_edited_authorized_profile() {
        let s = screen();
        s.provider.update_profile.push(Ok(()));

        s.view.first_name_text_change.accept("Anna".to_string());
        s.view.email_text_change.accept("anna@mail.com".to_string());
        s.view.update_profile_tap.accept(());
        settle().await;

        let expected = Profile {
            first_name: Some("Anna".to_string()),
            email: Some("anna@mail.com".to_string()),
            ..profile()
        };
        assert_eq!(s.provider.calls(), vec![Call::UpdateProfile(expected)]);
        assert_eq!(s.output.state.current(), ProfileEditorState::RoutedToProfile);
        assert!(s.output.state.current().is_final());
    }

    #[tokio::test]
    async fn retry_resends_the_failed_profile() {
        let s = screen();
        s.provider.update_profile.push(Err(ServiceError::Network));
        s.provider.update_profile.push(Ok(()));

        s.view.update_profile_tap.accept(());
        settle().await;
        assert!(s.output.state.current().is_loading_error());

        s.view.retry_tap.accept(());
        settle().await;

        assert_eq!(s.provider.count(|c| *c == Call::UpdateProfile(profile())), 2);
        assert_eq!(s.output.state.current(), ProfileEditorState::RoutedToProfile);
    }

    #[tokio::test]
    async fn alert_button_closes_only_after_success() {
        let s = screen();
        s.view.alert_button_tap.accept(());
        settle().await;
        assert!(s.router.routes().is_empty());

        s.provider.update_profile.push(Ok(()));
        s.view.update_profile_tap.accept(());
        settle().await;
        s.view.alert_button_tap.accept(());
        settle().await;

        assert_eq!(s.router.routes(), vec![Route::Close]);
    }

    #[tokio::test]
    async fn presenter_reports_email_error_on_submit() {
        let s = screen();
        let out = ProfileEditorPresenter::new(Arc::new(ScreensConfig::default())).transform(&s.output);
        let mut errors = out.email_validation_error.subscribe();
        let mut email = out.email.subscribe();

        s.view.email_text_change.accept("ann.mail.com".to_string());
        settle().await;
        s.view.update_profile_tap.accept(());
        settle().await;
        s.view.email_text_change.accept("ann@mail.com".to_string());
        settle().await;

        assert_eq!(
            ready(&mut errors),
            vec![None, Some("Invalid e-mail entered".to_string()), None]
        );
        assert_eq!(ready(&mut email), vec!["ann@mail.com".to_string()]);
    }

    #[tokio::test]
    async fn submit_checks_edit_sent_just_before_it() {
        let s = screen();
        let out = ProfileEditorPresenter::new(Arc::new(ScreensConfig::default())).transform(&s.output);
        let mut errors = out.email_validation_error.subscribe();

        s.view.email_text_change.accept("ann.mail.com".to_string());
        s.view.update_profile_tap.accept(());
        s.view.email_text_change.accept("ann@mail.com".to_string());
        s.view.update_profile_tap.accept(());
        settle().await;

        let emitted = ready(&mut errors);
        assert_eq!(emitted.last(), Some(&None));
        assert!(!s.output.screen_data_model.current().email_error_visible);
        assert_eq!(s.provider.count(|c| matches!(c, Call::UpdateProfile(_))), 1);
    }

    #[test]
    fn submitted_form_shows_error_until_next_edit() {
        let model = ProfileEditorScreenDataModel::new(&profile()).with_email("a@b@c");
        let submitted = model.submitted();
        assert!(submitted.email_error_visible);
        assert!(!submitted.with_last_name("Kim").email_error_visible);
        assert!(!ProfileEditorScreenDataModel::new(&profile()).submitted().email_error_visible);
    }

    #[tokio::test]
    async fn presenter_signals_success_once() {
        let s = screen();
        let out = ProfileEditorPresenter::new(Arc::new(ScreensConfig::default())).transform(&s.output);
        let mut edited = out.profile_successfully_edited.subscribe();
        let mut loading = out.loading_indicator_visible.subscribe();
        let mut first_name = out.first_name.subscribe();
        s.provider.update_profile.push(Ok(()));

        s.view.update_profile_tap.accept(());
        settle().await;

        assert_eq!(ready(&mut edited), vec![true]);
        assert_eq!(ready(&mut loading), vec![false, true, false]);
        assert_eq!(ready(&mut first_name), vec!["Ann".to_string()]);
    }
}
