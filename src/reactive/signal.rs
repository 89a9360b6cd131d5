//! Presenter outputs.
//!
//! A [`Driver`] is a replaying output: every subscriber first receives the
//! value derived from the current state, then later ones. A [`Signal`] is a
//! one-shot output: subscribers only see values emitted after subscribing.
//! Both are cold factories, so each subscription gets its own pipeline and
//! no subscriber can exhaust another.

use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;
use std::sync::Arc;

type Factory<T> = Arc<dyn Fn() -> BoxStream<'static, T> + Send + Sync>;

/// Replaying presenter output.
pub struct Driver<T> {
    factory: Factory<T>,
}

impl<T: Send + 'static> Driver<T> {
    /// Build a driver from a factory that must replay the current value.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> BoxStream<'static, T> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// A driver emitting a single constant value.
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(move || stream::once(future::ready(value.clone())).boxed())
    }

    /// Start a new subscription.
    pub fn subscribe(&self) -> BoxStream<'static, T> {
        (self.factory)()
    }

    pub fn map<U, F>(self, f: F) -> Driver<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Driver {
            factory: map_factory(self.factory, f),
        }
    }

    pub fn filter_map<U, F>(self, f: F) -> Driver<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        Driver {
            factory: filter_map_factory(self.factory, f),
        }
    }

    /// Emit `value` before anything else on every subscription.
    pub fn start_with(self, value: T) -> Self
    where
        T: Clone + Sync,
    {
        let source = self.factory;
        Self::new(move || {
            stream::once(future::ready(value.clone()))
                .chain(source())
                .boxed()
        })
    }

    /// Suppress consecutive duplicates within each subscription.
    pub fn distinct(self) -> Self
    where
        T: Clone + PartialEq,
    {
        let source = self.factory;
        Self::new(move || source().distinct_until_changed())
    }
}

impl<T> Clone for Driver<T> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<T> fmt::Debug for Driver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver").finish_non_exhaustive()
    }
}

/// One-shot presenter output.
pub struct Signal<T> {
    factory: Factory<T>,
}

impl<T: Send + 'static> Signal<T> {
    /// Build a signal from a factory that must not replay.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> BoxStream<'static, T> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    pub fn subscribe(&self) -> BoxStream<'static, T> {
        (self.factory)()
    }

    pub fn map<U, F>(self, f: F) -> Signal<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Signal {
            factory: map_factory(self.factory, f),
        }
    }

    pub fn filter_map<U, F>(self, f: F) -> Signal<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        Signal {
            factory: filter_map_factory(self.factory, f),
        }
    }

    /// Suppress consecutive duplicates within each subscription.
    pub fn distinct(self) -> Self
    where
        T: Clone + PartialEq,
    {
        let source = self.factory;
        Self::new(move || source().distinct_until_changed())
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal").finish_non_exhaustive()
    }
}

fn map_factory<T, U, F>(source: Factory<T>, f: F) -> Factory<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Arc::new(move || {
        let f = Arc::clone(&f);
        source().map(move |value| f(value)).boxed()
    })
}

fn filter_map_factory<T, U, F>(source: Factory<T>, f: F) -> Factory<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Option<U> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Arc::new(move || {
        let f = Arc::clone(&f);
        source()
            .filter_map(move |value| future::ready(f(value)))
            .boxed()
    })
}

/// Stream adapter dropping values equal to the previously emitted one.
pub trait DistinctExt: Stream + Sized + Send + 'static
where
    Self::Item: Clone + PartialEq + Send + 'static,
{
    fn distinct_until_changed(self) -> BoxStream<'static, Self::Item> {
        let mut last: Option<Self::Item> = None;
        self.filter_map(move |value| {
            let fresh = last.as_ref() != Some(&value);
            if fresh {
                last = Some(value.clone());
            }
            future::ready(fresh.then_some(value))
        })
        .boxed()
    }
}

impl<St> DistinctExt for St
where
    St: Stream + Send + 'static,
    St::Item: Clone + PartialEq + Send + 'static,
{
}
