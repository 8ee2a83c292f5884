//! Tri-state observable wrapper around a re-invocable async fetch.
//!
//! A [`Resource`] starts fetching as soon as it is observed and exposes the
//! latest outcome as a [`ResourceState`]. [`Resource::invalidate`] drops the
//! current value, goes back to `Pending` and fetches again. Overlapping
//! fetches are not ordered: whichever settles last is the state that sticks.

use std::{
    fmt,
    future::Future,
    sync::{Arc, Mutex},
};

use futures::{
    future::{self, BoxFuture},
    stream::{self, BoxStream},
    StreamExt,
};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState<T> {
    Pending,
    Ready(T),
    Errored(ClientError),
}

impl<T> ResourceState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Self::Errored(err) => Some(err),
            _ => None,
        }
    }
}

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

const TRANSITION_BUFFER: usize = 64;

/// Latest state plus a log of every transition.
///
/// `watch` alone folds a quick `Pending -> Ready` into its last value, so each
/// transition is also broadcast while the watch write lock is held.
struct StateCell<T> {
    latest: watch::Sender<ResourceState<T>>,
    transitions: broadcast::Sender<ResourceState<T>>,
}

impl<T: Clone> StateCell<T> {
    fn new() -> Self {
        let (latest, _) = watch::channel(ResourceState::Pending);
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);
        Self {
            latest,
            transitions,
        }
    }

    fn publish(&self, next: ResourceState<T>) {
        self.latest.send_modify(|state| {
            // no subscribers is fine
            let _ = self.transitions.send(next.clone());
            *state = next;
        });
    }

    /// Current state and a receiver for every transition after it, taken atomically.
    fn snapshot(&self) -> (ResourceState<T>, broadcast::Receiver<ResourceState<T>>) {
        let current = self.latest.borrow();
        let rx = self.transitions.subscribe();
        ((*current).clone(), rx)
    }
}

struct ResourceInner<T> {
    state: Arc<StateCell<T>>,
    fetcher: Fetcher<T>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl<T> Drop for ResourceInner<T> {
    fn drop(&mut self) {
        let in_flight = match self.in_flight.get_mut() {
            Ok(in_flight) => in_flight,
            Err(poisoned) => poisoned.into_inner(),
        };
        for handle in in_flight.drain(..) {
            handle.abort();
        }
    }
}

/// Shared handle to an observed fetch. Clones observe the same state.
///
/// Must be created and invalidated from within a tokio runtime. Dropping the
/// last handle aborts any fetch still in flight.
pub struct Resource<T> {
    inner: Arc<ResourceInner<T>>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Resource<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("state", &*self.inner.state.latest.borrow())
            .finish()
    }
}

impl<T> Resource<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wraps `fetcher` and immediately starts the first fetch.
    pub fn observe<F, Fut>(fetcher: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let resource = Self {
            inner: Arc::new(ResourceInner {
                state: Arc::new(StateCell::new()),
                fetcher: Arc::new(move || Box::pin(fetcher()) as BoxFuture<'static, Result<T>>),
                in_flight: Mutex::new(Vec::new()),
            }),
        };
        resource.start_fetch();
        resource
    }

    /// Discards the current value and fetches again.
    pub fn invalidate(&self) {
        debug!("resource invalidated");
        self.start_fetch();
    }

    fn start_fetch(&self) {
        self.inner.state.publish(ResourceState::Pending);

        let state = Arc::clone(&self.inner.state);
        let fetch = (self.inner.fetcher)();
        let handle = tokio::spawn(async move {
            let next = match fetch.await {
                Ok(value) => ResourceState::Ready(value),
                Err(err) => {
                    warn!(error = %err, "resource fetch failed");
                    ResourceState::Errored(err)
                }
            };
            state.publish(next);
        });

        let mut in_flight = match self.inner.in_flight.lock() {
            Ok(in_flight) => in_flight,
            Err(poisoned) => poisoned.into_inner(),
        };
        in_flight.retain(|handle| !handle.is_finished());
        in_flight.push(handle);
    }

    pub fn state(&self) -> ResourceState<T> {
        self.inner.state.latest.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.state.latest.borrow().is_pending()
    }

    pub fn value(&self) -> Option<T> {
        self.inner.state.latest.borrow().value().cloned()
    }

    pub fn error(&self) -> Option<ClientError> {
        self.inner.state.latest.borrow().error().cloned()
    }

    /// Receiver for the latest state only; intermediate states may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.inner.state.latest.subscribe()
    }

    /// The current state followed by every later transition, in order.
    ///
    /// A consumer that falls more than 64 transitions behind loses the
    /// oldest ones.
    pub fn changes(&self) -> BoxStream<'static, ResourceState<T>> {
        let (current, rx) = self.inner.state.snapshot();
        let transitions = BroadcastStream::new(rx).filter_map(|next| {
            future::ready(match next {
                Ok(state) => Some(state),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "resource change stream lagged");
                    None
                }
            })
        });
        stream::once(future::ready(current)).chain(transitions).boxed()
    }

    /// Waits until the resource holds a terminal state and returns it.
    pub async fn settled(&self) -> ResourceState<T> {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|state| !state.is_pending())
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }
}

#[cfg(test)]
#[path = "tests/resource_tests.rs"]
mod tests;
