//! Hot event sources.
//!
//! [`EventRelay`] publishes events to whoever is subscribed at the time of
//! publishing. [`BehaviorRelay`] additionally holds a current value and
//! replays it to each new subscriber. Every subscriber owns an unbounded
//! queue, so values are never coalesced or dropped for a live subscriber, and
//! subscribers are notified in subscription order.

use futures::Stream;
use parking_lot::Mutex;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Receiving end of a relay subscription.
///
/// Dropping the subscription unsubscribes; the relay prunes closed queues on
/// its next publish.
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    fn channel() -> (mpsc::UnboundedSender<T>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Take the next already-delivered value without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Take every already-delivered value without waiting.
    pub fn drain(&mut self) -> Vec<T> {
        let mut values = Vec::new();
        while let Ok(value) = self.rx.try_recv() {
            values.push(value);
        }
        values
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Publish relay: multicast events without replay.
///
/// Cloning yields another handle to the same relay.
///
/// # Example
///
/// ```rust
/// use stateful_screens::reactive::EventRelay;
///
/// let taps = EventRelay::new();
/// taps.accept(()); // nobody subscribed yet: dropped
///
/// let mut subscription = taps.subscribe();
/// taps.accept(());
/// assert_eq!(subscription.drain(), vec![()]);
/// ```
pub struct EventRelay<T> {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<T>>>>,
}

impl<T: Clone + Send + 'static> EventRelay<T> {
    /// Create a relay with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Publish a value to every live subscriber.
    pub fn accept(&self, value: T) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(value.clone()).is_ok());
    }

    /// Subscribe to values published from now on.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, subscription) = Subscription::channel();
        self.subscribers.lock().push(tx);
        subscription
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }
}

impl<T: Clone + Send + 'static> Default for EventRelay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventRelay<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> fmt::Debug for EventRelay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRelay").finish_non_exhaustive()
    }
}

struct BehaviorInner<T> {
    value: T,
    subscribers: Vec<mpsc::UnboundedSender<T>>,
}

/// Relay holding a current value, replayed to each new subscriber.
///
/// Reading the current value and registering a subscriber happen under the
/// same lock, so a subscriber observes the value current at subscription time
/// followed by every later value, with nothing missed in between.
pub struct BehaviorRelay<T> {
    inner: Arc<Mutex<BehaviorInner<T>>>,
}

impl<T: Clone + Send + 'static> BehaviorRelay<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BehaviorInner {
                value,
                subscribers: Vec::new(),
            })),
        }
    }

    /// The current value.
    pub fn value(&self) -> T {
        self.inner.lock().value.clone()
    }

    /// Overwrite the current value and notify subscribers in order.
    pub fn accept(&self, value: T) {
        let mut inner = self.inner.lock();
        inner.value = value;
        let BehaviorInner { value, subscribers } = &mut *inner;
        subscribers.retain(|tx| tx.send(value.clone()).is_ok());
    }

    /// Subscribe, receiving the current value first.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, subscription) = Subscription::channel();
        let mut inner = self.inner.lock();
        // cannot fail: the receiver is alive in `subscription`
        let _ = tx.send(inner.value.clone());
        inner.subscribers.push(tx);
        subscription
    }

    /// Subscribe to later values only.
    pub fn changes(&self) -> Subscription<T> {
        let (tx, subscription) = Subscription::channel();
        self.inner.lock().subscribers.push(tx);
        subscription
    }

    /// The current value and a subscription to every later value, taken
    /// under one lock.
    pub fn current_and_changes(&self) -> (T, Subscription<T>) {
        let (tx, subscription) = Subscription::channel();
        let mut inner = self.inner.lock();
        inner.subscribers.push(tx);
        (inner.value.clone(), subscription)
    }
}

impl<T> Clone for BehaviorRelay<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BehaviorRelay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorRelay")
            .field("value", &self.inner.lock().value)
            .finish_non_exhaustive()
    }
}
