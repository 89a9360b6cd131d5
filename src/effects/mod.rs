//! Request/Response bridge.
//!
//! This module is the imperative shell around the pure transition logic:
//! outbound service calls are fired as side effects of admitted transitions,
//! and their completions come back as ordinary response events.
//!
//! # Key Concepts
//!
//! - **Requests**: named, fire-and-forget, single-attempt calls. Firing never
//!   blocks the screen's owner task; the call runs on its own task.
//! - **Responses**: every completion is pushed into exactly one response
//!   relay, which the screen subscribes to as a transition source.
//! - **No cancellation**: a superseded response still arrives and is dropped
//!   by the guard of its transition.

use crate::reactive::EventRelay;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, Instrument, Span};

/// A named outbound call taking arguments `A`.
pub struct Request<A> {
    label: &'static str,
    fire: Arc<dyn Fn(A) + Send + Sync>,
}

impl<A: Send + 'static> Request<A> {
    /// Build a request from the service `call` and the `complete` handler
    /// receiving its result.
    pub fn new<T, E, C, Fut, K>(label: &'static str, call: C, complete: K) -> Self
    where
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
        C: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        K: Fn(Result<T, E>) + Send + Sync + 'static,
    {
        let complete = Arc::new(complete);
        Self {
            label,
            fire: Arc::new(move |args| {
                debug!(request = label, "request fired");
                let pending = call(args);
                let complete = Arc::clone(&complete);
                let task = async move {
                    let result = pending.await;
                    match &result {
                        Ok(_) => debug!(request = label, "response received"),
                        Err(error) => debug!(request = label, %error, "error response received"),
                    }
                    complete(result);
                };
                tokio::spawn(task.instrument(Span::current()));
            }),
        }
    }

    /// Start the call. Returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fire(&self, args: A) {
        (self.fire)(args)
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<A> Clone for Request<A> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            fire: Arc::clone(&self.fire),
        }
    }
}

impl<A> fmt::Debug for Request<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Build a request whose successes go to `ok` and failures to `err`.
pub fn bridge<A, T, E, C, Fut>(
    label: &'static str,
    call: C,
    ok: EventRelay<T>,
    err: EventRelay<E>,
) -> Request<A>
where
    A: Send + 'static,
    T: Clone + Send + 'static,
    E: Clone + fmt::Display + Send + 'static,
    C: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Request::new(label, call, move |result| match result {
        Ok(value) => ok.accept(value),
        Err(error) => err.accept(error),
    })
}
