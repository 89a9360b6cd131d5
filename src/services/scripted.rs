//! Scripted services for driving screens deterministically.
//!
//! Each call pops the next reply queued for its method. A reply is either
//! ready, or deferred and released later by the test through the returned
//! sender. A call with nothing queued never completes.

use super::{AuthError, AuthorizationProfileProvider, Profile, ProfileService, ServiceError};
use crate::reactive::BehaviorRelay;
use async_trait::async_trait;
use futures::future;
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use tokio::sync::oneshot;

/// One queued reply.
pub enum Reply<T> {
    Ready(T),
    Deferred(oneshot::Receiver<T>),
}

/// Reply queue of one service method.
pub struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
}

impl<T: Send> Script<T> {
    fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue a reply delivered as soon as the call is made.
    pub fn push(&self, reply: T) {
        self.replies.lock().push_back(Reply::Ready(reply));
    }

    /// Queue a reply delivered when the returned sender fires.
    pub fn defer(&self) -> oneshot::Sender<T> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn pending(&self) -> usize {
        self.replies.lock().len()
    }

    async fn next(&self) -> T {
        let reply = self.replies.lock().pop_front();
        match reply {
            Some(Reply::Ready(value)) => value,
            Some(Reply::Deferred(rx)) => match rx.await {
                Ok(value) => value,
                Err(_) => future::pending().await,
            },
            None => future::pending().await,
        }
    }
}

impl<T> fmt::Debug for Script<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("queued", &self.replies.lock().len())
            .finish()
    }
}

/// A call received by the [`ScriptedProvider`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CheckNumber(String),
    CheckCode(String),
    UpdatePhoneNumber(String),
    UpdateProfile(Profile),
    GetProfile,
}

/// Service double whose replies are queued by the test.
#[derive(Debug)]
pub struct ScriptedProvider {
    pub check_number: Script<Result<String, ServiceError>>,
    pub check_code: Script<Result<(), AuthError>>,
    pub update_phone_number: Script<Result<(), ServiceError>>,
    pub update_profile: Script<Result<(), ServiceError>>,
    pub get_profile: Script<Result<Profile, ServiceError>>,
    profile: BehaviorRelay<Profile>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedProvider {
    pub fn new(profile: Profile) -> Self {
        Self {
            check_number: Script::new(),
            check_code: Script::new(),
            update_phone_number: Script::new(),
            update_profile: Script::new(),
            get_profile: Script::new(),
            profile: BehaviorRelay::new(profile),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Publish a profile on the `profile_changed` feed.
    pub fn publish_profile(&self, profile: Profile) {
        self.profile.accept(profile);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Number of received calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    fn log(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new(Profile::unauthorized("+7 999 123 45 67"))
    }
}

#[async_trait]
impl AuthorizationProfileProvider for ScriptedProvider {
    async fn check_number(&self, phone_digits: &str) -> Result<String, ServiceError> {
        self.log(Call::CheckNumber(phone_digits.to_string()));
        self.check_number.next().await
    }

    async fn check_code(&self, code: &str) -> Result<(), AuthError> {
        self.log(Call::CheckCode(code.to_string()));
        self.check_code.next().await
    }

    async fn update_phone_number(&self, phone_number: &str) -> Result<(), ServiceError> {
        self.log(Call::UpdatePhoneNumber(phone_number.to_string()));
        self.update_phone_number.next().await
    }

    async fn update_profile(&self, profile: Profile) -> Result<(), ServiceError> {
        self.log(Call::UpdateProfile(profile));
        self.update_profile.next().await
    }
}

#[async_trait]
impl ProfileService for ScriptedProvider {
    fn profile_changed(&self) -> BoxStream<'static, Profile> {
        self.profile.subscribe().boxed()
    }

    async fn get_profile(&self) -> Result<Profile, ServiceError> {
        self.log(Call::GetProfile);
        self.get_profile.next().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[tokio::test]
    async fn ready_replies_are_returned_in_order() {
        let provider = ScriptedProvider::default();
        provider.check_number.push(Err(ServiceError::Network));
        provider.check_number.push(Ok("12345".to_string()));

        assert_eq!(provider.check_number("7").await, Err(ServiceError::Network));
        assert_eq!(provider.check_number("7").await, Ok("12345".to_string()));
        assert_eq!(
            provider.calls(),
            vec![Call::CheckNumber("7".to_string()), Call::CheckNumber("7".to_string())]
        );
    }

    #[tokio::test]
    async fn deferred_reply_waits_for_release() {
        let provider = ScriptedProvider::default();
        let release = provider.check_code.defer();

        let mut call = Box::pin(provider.check_code("11111"));
        assert!((&mut call).now_or_never().is_none());

        release.send(Err(AuthError::Validation)).unwrap();
        assert_eq!(call.await, Err(AuthError::Validation));
    }

    #[tokio::test]
    async fn empty_script_never_completes() {
        let provider = ScriptedProvider::default();
        let call = provider.update_profile(Profile::unauthorized("1"));

        assert!(call.now_or_never().is_none());
        assert_eq!(provider.count(|c| matches!(c, Call::UpdateProfile(_))), 1);
    }
}
