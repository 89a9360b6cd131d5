//! Collaborator contracts consumed by the screens.
//!
//! Every call is asynchronous and single-attempt. Screens never await these
//! calls themselves: the request bridge in [`crate::effects`] spawns them and
//! turns their completion into response events.

mod error;
mod memory;
mod scripted;

pub use error::{AuthError, ServiceError};
pub use memory::{InMemoryProvider, SimulationConfig};
pub use scripted::{Call, Reply, Script, ScriptedProvider};

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// The user profile as the services know it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub authorized: bool,
}

impl Profile {
    /// Profile of a user who has not confirmed a phone number yet.
    pub fn unauthorized(phone: impl Into<String>) -> Self {
        Self {
            first_name: None,
            last_name: None,
            email: None,
            phone: phone.into(),
            authorized: false,
        }
    }
}

/// Authorization and profile updates.
#[async_trait]
pub trait AuthorizationProfileProvider: Send + Sync {
    /// Request an SMS code for `phone_digits`, returning the code sent.
    async fn check_number(&self, phone_digits: &str) -> Result<String, ServiceError>;

    async fn check_code(&self, code: &str) -> Result<(), AuthError>;

    async fn update_phone_number(&self, phone_number: &str) -> Result<(), ServiceError>;

    async fn update_profile(&self, profile: Profile) -> Result<(), ServiceError>;
}

/// Read access to the current profile.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Live feed of the profile. Replays the current profile to every new
    /// subscriber and never completes.
    fn profile_changed(&self) -> BoxStream<'static, Profile>;

    async fn get_profile(&self) -> Result<Profile, ServiceError>;
}
