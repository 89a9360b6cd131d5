//! Helpers shared by the unit tests.

use crate::navigation::{
    AuthorizationRouting, ProfileEditorRouting, ProfileRouting, ValidatorListener,
};
use crate::services::Profile;
use futures::{FutureExt, Stream, StreamExt};
use parking_lot::Mutex;
use std::time::Duration;

/// Let spawned tasks run until they are idle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Every value a stream has ready right now.
pub fn ready<St: Stream + Unpin>(stream: &mut St) -> Vec<St::Item> {
    let mut values = Vec::new();
    while let Some(Some(value)) = stream.next().now_or_never() {
        values.push(value);
    }
    values
}

#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Validator(String),
    Close,
    Edit(Profile),
    SuccessAuth,
    ClosedValidatorView,
}

/// Router and listener recording every route it is asked to perform.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    routes: Mutex<Vec<Route>>,
}

impl RecordingRouter {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }

    fn record(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

impl AuthorizationRouting for RecordingRouter {
    fn route_to_validator(&self, phone_number: String) {
        self.record(Route::Validator(phone_number));
    }

    fn close(&self) {
        self.record(Route::Close);
    }
}

impl ProfileRouting for RecordingRouter {
    fn route_to_edit(&self, profile: Profile) {
        self.record(Route::Edit(profile));
    }
}

impl ProfileEditorRouting for RecordingRouter {
    fn close(&self) {
        self.record(Route::Close);
    }
}

impl ValidatorListener for RecordingRouter {
    fn success_auth(&self) {
        self.record(Route::SuccessAuth);
    }

    fn closed_validator_view(&self) {
        self.record(Route::ClosedValidatorView);
    }
}
