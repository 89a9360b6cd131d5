//! Profile view.
//!
//! Loads the profile when activated, supports pull-to-refresh and retry, and
//! follows out-of-band profile changes while data is shown.

use crate::config::ScreensConfig;
use crate::core::{Extractor, Guard, State};
use crate::effects::{bridge, Request};
use crate::navigation::{with_live, ProfileRouting, ScreenId};
use crate::presentation::{refresh_loading_indicator_events, ErrorMessageViewModel, TitledOptionalText};
use crate::reactive::{
    DataModelStore, DisposeBag, Driver, EventRelay, GuardedExt, ModelUpdates, ReadOnlyState,
    ScreenLoop, Signal, StateStore,
};
use crate::screen_state;
use crate::services::{Profile, ProfileService, ServiceError};
use crate::transitions;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};

#[derive(Clone, Debug, PartialEq)]
pub enum ProfileState {
    IsLoading,
    DataLoaded { profile: Profile },
    LoadingError { error: ServiceError },
}

screen_state! {
    ProfileState { IsLoading, DataLoaded, LoadingError }
    loading: [IsLoading]
    data_loaded: [DataLoaded]
    loading_error: [LoadingError]
}

#[derive(Clone, Debug, Default)]
pub struct ProfileViewOutput {
    pub retry_tap: EventRelay<()>,
    pub pull_to_refresh: EventRelay<()>,
    pub edit_profile_tap: EventRelay<()>,
}

#[derive(Debug, Default)]
struct Responses {
    did_load_profile: EventRelay<Profile>,
    profile_loading_error: EventRelay<ServiceError>,
}

struct Requests {
    load_profile: Request<()>,
}

pub struct ProfileInteractor {
    id: ScreenId,
    service: Arc<dyn ProfileService>,
    router: Weak<dyn ProfileRouting>,
    state: StateStore<ProfileState>,
    responses: Responses,
    requests: Requests,
    dispose_bag: DisposeBag,
}

impl ProfileInteractor {
    pub fn new(service: Arc<dyn ProfileService>, router: Weak<dyn ProfileRouting>) -> Self {
        let responses = Responses::default();
        let requests = Self::make_requests(&service, &responses);
        Self {
            id: ScreenId::new(),
            service,
            router,
            state: StateStore::new(ProfileState::IsLoading),
            responses,
            requests,
            dispose_bag: DisposeBag::new(),
        }
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    /// Start the initial load. Call after [`transform`](Self::transform).
    pub fn activate(&self) {
        self.requests.load_profile.fire(());
    }

    /// Wire the view events to the state machine and start the screen.
    ///
    /// Call once, from within a tokio runtime.
    pub fn transform(&self, view: &ProfileViewOutput) -> ReadOnlyState<ProfileState> {
        let by_is_loading = || Guard::new(|s: &ProfileState| matches!(s, ProfileState::IsLoading));
        let by_data_loaded =
            || Guard::new(|s: &ProfileState| matches!(s, ProfileState::DataLoaded { .. }));
        let by_loading_error =
            Guard::new(|s: &ProfileState| matches!(s, ProfileState::LoadingError { .. }));
        let by_loaded_profile = Extractor::new(|s: &ProfileState| match s {
            ProfileState::DataLoaded { profile } => Some(profile.clone()),
            _ => None,
        });

        let refresh = self.requests.load_profile.clone();
        let retry = self.requests.load_profile.clone();
        let router = self.router.clone();

        let state_transitions = transitions![
            self.responses
                .did_load_profile
                .subscribe()
                .guarded_by(by_is_loading())
                .to_state(|profile| ProfileState::DataLoaded { profile }),
            self.responses
                .profile_loading_error
                .subscribe()
                .guarded_by(by_is_loading())
                .to_state(|error| ProfileState::LoadingError { error }),
            view.pull_to_refresh
                .subscribe()
                .guarded_by(by_data_loaded())
                .effect(move |()| refresh.fire(()))
                .to_state(|()| ProfileState::IsLoading),
            view.retry_tap
                .subscribe()
                .guarded_by(by_loading_error)
                .effect(move |()| retry.fire(()))
                .to_state(|()| ProfileState::IsLoading),
            self.service
                .profile_changed()
                .guarded_by(by_data_loaded())
                .to_state(|profile| ProfileState::DataLoaded { profile }),
            view.edit_profile_tap
                .subscribe()
                .filter_mapped_by(by_loaded_profile)
                .route(move |((), profile)| {
                    with_live(&router, "route_to_edit", |router| router.route_to_edit(profile))
                }),
        ];

        ScreenLoop {
            kind: "profile",
            id: self.id,
            state: self.state.clone(),
            transitions: state_transitions,
            model: DataModelStore::new(()),
            updates: ModelUpdates::none(),
        }
        .spawn(&self.dispose_bag);

        self.state.read_only()
    }

    fn make_requests(service: &Arc<dyn ProfileService>, responses: &Responses) -> Requests {
        let service = Arc::clone(service);
        Requests {
            load_profile: bridge(
                "get_profile",
                move |()| {
                    let service = Arc::clone(&service);
                    async move { service.get_profile().await }
                },
                responses.did_load_profile.clone(),
                responses.profile_loading_error.clone(),
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileViewModel {
    /// Registration status caption.
    pub authorized: String,
    pub first_name: TitledOptionalText,
    pub last_name: TitledOptionalText,
    pub email: TitledOptionalText,
    pub phone: TitledOptionalText,
}

impl ProfileViewModel {
    pub fn new(profile: &Profile, config: &ScreensConfig) -> Self {
        let authorized = if profile.authorized {
            &config.authorized_title
        } else {
            &config.unauthorized_title
        };
        Self {
            authorized: authorized.clone(),
            first_name: TitledOptionalText::new("First name", profile.first_name.clone()),
            last_name: TitledOptionalText::new("Last name", profile.last_name.clone()),
            email: TitledOptionalText::new("E-mail", profile.email.clone()),
            phone: TitledOptionalText::new("Phone", Some(profile.phone.clone())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProfilePresenterOutput {
    pub view_model: Driver<ProfileViewModel>,
    /// Once the first profile is shown, the content stays visible.
    pub is_content_visible: Driver<bool>,
    pub initial_loading_indicator_visible: Driver<bool>,
    pub hide_refresh_control: Signal<()>,
    pub is_edit_enabled: Driver<bool>,
    /// `None` hides the alert.
    pub show_error: Signal<Option<ErrorMessageViewModel>>,
}

#[derive(Clone, Debug)]
pub struct ProfilePresenter {
    config: Arc<ScreensConfig>,
}

impl ProfilePresenter {
    pub fn new(config: Arc<ScreensConfig>) -> Self {
        Self { config }
    }

    pub fn transform(&self, state: &ReadOnlyState<ProfileState>) -> ProfilePresenterOutput {
        let config = Arc::clone(&self.config);
        let view_model = state
            .driver()
            .filter_map(move |state| match state {
                ProfileState::DataLoaded { profile } => Some(ProfileViewModel::new(&profile, &config)),
                ProfileState::IsLoading | ProfileState::LoadingError { .. } => None,
            })
            .distinct();

        let is_content_visible = state
            .driver()
            .filter_map(|state| state.is_data_loaded().then_some(true))
            .start_with(false)
            .distinct();

        let refresh = refresh_loading_indicator_events(state);

        let is_edit_enabled = state
            .driver()
            .map(|state| match state {
                ProfileState::DataLoaded { profile } => profile.authorized,
                ProfileState::IsLoading | ProfileState::LoadingError { .. } => false,
            })
            .distinct();

        // every error state shows the alert again, so no distinct here
        let retry_title = self.config.retry_button_title.clone();
        let show_error = state.signal().map(move |state| match state {
            ProfileState::LoadingError { error } => {
                Some(ErrorMessageViewModel::for_error(&error, &retry_title))
            }
            ProfileState::IsLoading | ProfileState::DataLoaded { .. } => None,
        });

        ProfilePresenterOutput {
            view_model,
            is_content_visible,
            initial_loading_indicator_visible: refresh.initial_loading_indicator_visible,
            hide_refresh_control: refresh.hide_refresh_control,
            is_edit_enabled,
            show_error,
        }
    }
}
