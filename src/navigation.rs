//! Routing contracts between screens.
//!
//! Interactors never own their routers or listeners. They hold `Weak`
//! handles and upgrade them at the moment a route fires; a route whose target
//! is gone is skipped.

use crate::services::Profile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Weak;
use tracing::debug;
use uuid::Uuid;

/// Identity of one screen instance, used to correlate log output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenId(Uuid);

impl ScreenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form keeps span fields readable
        let id = self.0.simple().to_string();
        f.write_str(&id[..8])
    }
}

pub trait AuthorizationRouting: Send + Sync {
    /// Present the code validator for the given formatted phone number.
    fn route_to_validator(&self, phone_number: String);
    fn close(&self);
}

pub trait ProfileRouting: Send + Sync {
    fn route_to_edit(&self, profile: Profile);
}

pub trait ProfileEditorRouting: Send + Sync {
    fn close(&self);
}

/// Events the code validator reports to the screen that presented it.
pub trait ValidatorListener: Send + Sync {
    fn success_auth(&self);
    fn closed_validator_view(&self);
}

/// Upgrade `target` and run `route` on it, or log that it is gone.
pub(crate) fn with_live<T: ?Sized>(target: &Weak<T>, route: &str, f: impl FnOnce(&T)) {
    match target.upgrade() {
        Some(live) => f(&live),
        None => debug!(route, "route target released, skipping"),
    }
}
