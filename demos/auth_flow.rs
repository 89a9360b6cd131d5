//! Authorization Flow
//!
//! This example walks a user through the whole app against the simulated
//! provider: phone entry, SMS code check and the profile screen.
//!
//! Key concepts:
//! - Interactors owning guarded state machines
//! - Presenters projecting state for the view
//! - The validator reporting back to the authorization screen
//! - Responses to superseded requests being dropped by guards
//!
//! Run with: cargo run --example auth_flow
//! Pass a TOML file path to override the screen settings, and set
//! STATEFUL_SCREENS_LOG=stateful_screens=debug to watch every transition.

use futures::{FutureExt, Stream, StreamExt};
use parking_lot::Mutex;
use stateful_screens::logging::init_tracing;
use stateful_screens::navigation::{AuthorizationRouting, ProfileRouting};
use stateful_screens::screens::authorization::{
    AuthorizationInteractor, AuthorizationPresenter, AuthorizationViewOutput,
};
use stateful_screens::screens::profile::{ProfileInteractor, ProfilePresenter, ProfileViewOutput};
use stateful_screens::screens::validator::{
    ValidatorInteractor, ValidatorPresenter, ValidatorViewOutput,
};
use stateful_screens::services::{InMemoryProvider, Profile, SimulationConfig};
use stateful_screens::{ScreensConfig, State};
use std::sync::Arc;
use std::time::Duration;

// Navigation shell
#[derive(Default)]
struct App {
    validator_phone: Mutex<Option<String>>,
}

impl AuthorizationRouting for App {
    fn route_to_validator(&self, phone_number: String) {
        println!("  -> presenting code validator for {phone_number}");
        *self.validator_phone.lock() = Some(phone_number);
    }

    fn close(&self) {
        println!("  -> authorization closed");
    }
}

impl ProfileRouting for App {
    fn route_to_edit(&self, profile: Profile) {
        println!("  -> editing profile of {}", profile.phone);
    }
}

/// Everything a presenter output has emitted so far.
fn emitted<St: Stream + Unpin>(stream: &mut St) -> Vec<St::Item> {
    let mut values = Vec::new();
    while let Some(Some(value)) = stream.next().now_or_never() {
        values.push(value);
    }
    values
}

async fn wait(latency_ms: u64) {
    tokio::time::sleep(Duration::from_millis(latency_ms * 2 + 50)).await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    println!("=== Authorization Flow ===\n");

    let config = match std::env::args().nth(1) {
        Some(path) => ScreensConfig::load(path)?,
        None => ScreensConfig::default(),
    };
    let config = Arc::new(config);
    let simulation = SimulationConfig {
        latency_ms: 100,
        code_length: config.sms_code_length,
        ..SimulationConfig::default()
    };
    let latency = simulation.latency_ms;
    let provider = Arc::new(InMemoryProvider::new(simulation));
    let app = Arc::new(App::default());

    // 1. Phone entry
    println!("1. Entering the phone number");
    let routing: Arc<dyn AuthorizationRouting> = app.clone();
    let authorization =
        AuthorizationInteractor::new(provider.clone(), Arc::downgrade(&routing), config.clone());
    let auth_view = AuthorizationViewOutput::default();
    let auth_output = authorization.transform(&auth_view);
    let auth_presenter = AuthorizationPresenter::new(config.clone()).transform(&auth_output);
    let mut shown_codes = auth_presenter.show_code.subscribe();

    for text in ["7", "7999", "+7 (999) 123-45-67"] {
        auth_view.phone_number_text_change.accept(text.to_string());
        wait(0).await;
        let phone = auth_presenter.phone_number.subscribe().next().await;
        let enabled = auth_presenter.is_button_enabled.subscribe().next().await;
        println!("  typed {text:?}: shown {phone:?}, button enabled {enabled:?}");
    }

    auth_view.get_sms_tap.accept(());
    auth_view.get_sms_tap.accept(());
    println!("  tapped twice, state: {}", auth_output.state.current().name());
    wait(latency).await;
    for code in emitted(&mut shown_codes) {
        println!("  SMS received: {code}");
    }

    // 2. Code check
    println!("\n2. Checking the SMS code");
    let phone = app.validator_phone.lock().clone().unwrap_or_default();
    let validator = ValidatorInteractor::new(
        provider.clone(),
        phone.clone(),
        authorization.listener(),
        config.clone(),
    );
    let validator_view = ValidatorViewOutput::default();
    let validator_output = validator.transform(&validator_view);
    let validator_presenter = ValidatorPresenter::new(phone).transform(&validator_output);
    let mut validation_errors = validator_presenter.show_validation_error.subscribe();

    validator_view.code_text_change.accept("00000".to_string());
    wait(latency).await;
    for message in emitted(&mut validation_errors).into_iter().flatten() {
        println!("  wrong code: {message}");
    }

    let code = provider.last_sms_code().unwrap_or_default();
    validator_view.code_text_change.accept(code);
    wait(latency * 2).await;
    println!("  validator state: {}", validator_output.state.current().name());
    for transition in validator_output.state.history().transitions() {
        println!(
            "    {} -> {} (attempt {})",
            transition.from.name(),
            transition.to.name(),
            transition.attempt
        );
    }

    // 3. Profile
    println!("\n3. Loading the profile");
    let profile_routing: Arc<dyn ProfileRouting> = app.clone();
    let profile = ProfileInteractor::new(provider.clone(), Arc::downgrade(&profile_routing));
    let profile_view = ProfileViewOutput::default();
    let profile_state = profile.transform(&profile_view);
    let profile_presenter = ProfilePresenter::new(config.clone()).transform(&profile_state);
    let mut errors = profile_presenter.show_error.subscribe();

    profile.activate();
    wait(latency).await;
    for error in emitted(&mut errors).into_iter().flatten() {
        println!("  alert: {} [{}]", error.title, error.button_title);
    }

    profile_view.retry_tap.accept(());
    wait(latency).await;
    if let Some(view_model) = emitted(&mut profile_presenter.view_model.subscribe()).pop() {
        println!("  {}", view_model.authorized);
        let fields = [
            &view_model.first_name,
            &view_model.last_name,
            &view_model.email,
            &view_model.phone,
        ];
        for field in fields {
            println!("    {}: {}", field.title, field.maybe_text.as_deref().unwrap_or("-"));
        }
    }

    profile_view.edit_profile_tap.accept(());
    wait(0).await;

    println!("\n=== Flow Complete ===");
    Ok(())
}
