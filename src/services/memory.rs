//! Simulated in-memory services.

use super::{AuthError, AuthorizationProfileProvider, Profile, ProfileService, ServiceError};
use crate::reactive::BehaviorRelay;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use rand::Rng;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// Behaviour of the simulated services.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Delay before every reply.
    pub latency_ms: u64,
    /// Fail roughly every other call with a network error.
    pub flaky: bool,
    /// Digits in a generated SMS code.
    pub code_length: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            latency_ms: 300,
            flaky: false,
            code_length: 5,
        }
    }
}

/// Both service contracts backed by memory.
///
/// The first `get_profile` call always fails so the loading error path of the
/// profile screen can be seen.
#[derive(Debug)]
pub struct InMemoryProvider {
    config: SimulationConfig,
    profile: BehaviorRelay<Profile>,
    sms_code: Mutex<Option<String>>,
    profile_requests: AtomicUsize,
}

impl InMemoryProvider {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_profile(config, Profile::unauthorized("+7 999 123 45 67"))
    }

    pub fn with_profile(config: SimulationConfig, profile: Profile) -> Self {
        Self {
            config,
            profile: BehaviorRelay::new(profile),
            sms_code: Mutex::new(None),
            profile_requests: AtomicUsize::new(0),
        }
    }

    pub fn current_profile(&self) -> Profile {
        self.profile.value()
    }

    /// The code sent by the last successful `check_number`.
    pub fn last_sms_code(&self) -> Option<String> {
        self.sms_code.lock().clone()
    }

    /// Wait for the configured latency and decide whether the call succeeds.
    async fn simulate(&self, call: &'static str) -> bool {
        tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        let succeeded = !(self.config.flaky && coin());
        debug!(call, succeeded, "simulated call");
        succeeded
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

fn coin() -> bool {
    rand::thread_rng().gen_bool(0.5)
}

/// Random decimal code, every digit uniformly drawn.
fn random_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[async_trait]
impl AuthorizationProfileProvider for InMemoryProvider {
    async fn check_number(&self, _phone_digits: &str) -> Result<String, ServiceError> {
        if !self.simulate("check_number").await {
            return Err(ServiceError::Network);
        }
        let code = random_code(self.config.code_length);
        *self.sms_code.lock() = Some(code.clone());
        Ok(code)
    }

    async fn check_code(&self, code: &str) -> Result<(), AuthError> {
        if !self.simulate("check_code").await {
            return Err(AuthError::Network);
        }
        match self.sms_code.lock().as_deref() {
            Some(sent) if sent == code => Ok(()),
            _ => Err(AuthError::Validation),
        }
    }

    async fn update_phone_number(&self, phone_number: &str) -> Result<(), ServiceError> {
        if !self.simulate("update_phone_number").await {
            return Err(ServiceError::Network);
        }
        self.profile.accept(Profile {
            authorized: true,
            ..Profile::unauthorized(phone_number)
        });
        Ok(())
    }

    async fn update_profile(&self, profile: Profile) -> Result<(), ServiceError> {
        if !self.simulate("update_profile").await {
            return Err(ServiceError::Network);
        }
        self.profile.accept(profile);
        Ok(())
    }
}

#[async_trait]
impl ProfileService for InMemoryProvider {
    fn profile_changed(&self) -> BoxStream<'static, Profile> {
        self.profile.subscribe().boxed()
    }

    async fn get_profile(&self) -> Result<Profile, ServiceError> {
        let request = self.profile_requests.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        if request == 0 {
            return Err(ServiceError::BadNetwork);
        }
        Ok(self.profile.value())
    }
}
