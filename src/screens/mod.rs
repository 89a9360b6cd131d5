//! The four screens, each an interactor owning the state machine and a
//! presenter projecting its state for the view.

pub mod authorization;
pub mod profile;
pub mod profile_editor;
pub mod validator;
