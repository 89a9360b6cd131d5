//! Validation of the profile editing form.
//!
//! Uses Stillwater's `Validation` type to accumulate every problem with the
//! form instead of stopping at the first one.

use crate::format::EmailValidationError;
use crate::screens::profile_editor::ProfileEditorScreenDataModel;
use crate::services::Profile;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A problem that keeps the form from being submitted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    InvalidEmail(#[from] EmailValidationError),

    #[error("Phone number is missing")]
    MissingPhone,
}

type Check = Validation<(), NonEmptyVec<FormError>>;

/// Validate the form and compose the profile to submit.
///
/// The composed profile is always `authorized`: only confirmed users can edit
/// their profile. Empty name fields become `None`.
pub fn validate_profile_form(
    form: &ProfileEditorScreenDataModel,
) -> Validation<Profile, NonEmptyVec<FormError>> {
    let checks: Vec<Check> = vec![check_email(form), check_phone(form)];

    Validation::all_vec(checks).map(|_| Profile {
        first_name: non_empty(&form.first_name),
        last_name: non_empty(&form.last_name),
        email: form.email.clone().ok().flatten(),
        phone: form.phone.clone(),
        authorized: true,
    })
}

fn check_email(form: &ProfileEditorScreenDataModel) -> Check {
    match &form.email {
        Ok(_) => Validation::success(()),
        Err(error) => Validation::fail(FormError::from(error.clone())),
    }
}

fn check_phone(form: &ProfileEditorScreenDataModel) -> Check {
    if form.phone.trim().is_empty() {
        Validation::fail(FormError::MissingPhone)
    } else {
        Validation::success(())
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
