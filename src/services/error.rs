//! Errors reported by the collaborator services.
//!
//! The `Display` text of each error is what presenters show to the user.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a generic network call.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ServiceError {
    #[error("The internet connection appears to be offline")]
    Network,

    #[error("Failed to load data from the network")]
    BadNetwork,
}

/// Failure of an SMS code check.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AuthError {
    #[error("The internet connection appears to be offline")]
    Network,

    #[error("Invalid code entered")]
    Validation,
}

impl AuthError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation)
    }
}
