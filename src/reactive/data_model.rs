//! Screen Data Model Updater.
//!
//! Every input field of a screen contributes an update stream. Updates are
//! merged and folded into the screen data model in arrival order, each one
//! applied to the model produced by its predecessor. There is no guard.

use futures::stream::{self, BoxStream, SelectAll, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// A pending change, applied to the model current at application time.
pub type ModelUpdate<M> = Box<dyn FnOnce(&M) -> M + Send>;

/// Updates contributed by a single input field.
pub struct FieldUpdates<M> {
    updates: BoxStream<'static, ModelUpdate<M>>,
}

/// Turn a stream of raw field values into data model updates.
///
/// `mutate` receives the model current at application time and the raw
/// value, and returns the refined model.
pub fn field<M, T, St, F>(values: St, mutate: F) -> FieldUpdates<M>
where
    M: 'static,
    T: Send + 'static,
    St: Stream<Item = T> + Send + 'static,
    F: Fn(&M, T) -> M + Send + Sync + 'static,
{
    let mutate = Arc::new(mutate);
    FieldUpdates {
        updates: values
            .map(move |value| {
                let mutate = Arc::clone(&mutate);
                Box::new(move |model: &M| mutate(model, value)) as ModelUpdate<M>
            })
            .boxed(),
    }
}

impl<M> fmt::Debug for FieldUpdates<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldUpdates").finish_non_exhaustive()
    }
}

/// All field updates of one screen.
pub struct ModelUpdates<M> {
    merged: SelectAll<BoxStream<'static, ModelUpdate<M>>>,
}

/// Merge the update streams of every field.
pub fn merge_fields<M: 'static>(fields: Vec<FieldUpdates<M>>) -> ModelUpdates<M> {
    ModelUpdates {
        merged: stream::select_all(fields.into_iter().map(|field| field.updates)),
    }
}

impl<M: 'static> ModelUpdates<M> {
    /// Updates for a screen without input fields.
    pub fn none() -> Self {
        merge_fields(Vec::new())
    }
}

impl<M> Stream for ModelUpdates<M> {
    type Item = ModelUpdate<M>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.merged).poll_next(cx)
    }
}

impl<M> fmt::Debug for ModelUpdates<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelUpdates")
            .field("fields", &self.merged.len())
            .finish()
    }
}
