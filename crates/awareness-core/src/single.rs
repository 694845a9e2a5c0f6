//! [`Single`] – a lazy, cancellable, single-value asynchronous result.
//!
//! A `Single<T>` resolves to exactly one [`Outcome<T>`].  Nothing happens
//! until it is polled; dropping it before it resolves cancels the call and
//! releases every resource the call holds.
//!
//! Two ways to consume one:
//!
//! * `.await` it directly (cancel by dropping the future, or race it against
//!   a [`CancellationToken`] with [`Single::until_cancelled`]).
//! * [`Single::subscribe`] an observer callback on the Tokio runtime and keep
//!   the returned [`Subscription`] to cancel it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use awareness_types::{AwarenessError, Outcome, ProjectionError};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A single-shot asynchronous result.
#[must_use = "a Single does nothing unless awaited or subscribed"]
pub struct Single<T> {
    inner: BoxFuture<'static, Outcome<T>>,
}

impl<T: Send + 'static> Single<T> {
    pub fn new(future: impl Future<Output = Outcome<T>> + Send + 'static) -> Self {
        Self {
            inner: future.boxed(),
        }
    }

    /// Transform the success value.
    pub fn map<U, F>(self, f: F) -> Single<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Single::new(self.inner.map(|outcome| outcome.map(f)))
    }

    /// Transform the success value with a projection that may fail.
    pub fn try_map<U, F>(self, f: F) -> Single<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U, ProjectionError> + Send + 'static,
    {
        Single::new(
            self.inner
                .map(|outcome| outcome.and_then(|value| f(value).map_err(AwarenessError::from))),
        )
    }

    /// Resolve, unless `token` is cancelled first.
    ///
    /// Returns `None` when cancelled; the call is dropped and its resources
    /// released before this returns.
    pub async fn until_cancelled(self, token: &CancellationToken) -> Option<Outcome<T>> {
        tokio::select! {
            biased;
            _ = token.cancelled() => None,
            outcome = self => Some(outcome),
        }
    }

    /// Drive the call on the current Tokio runtime and hand its outcome to
    /// `observer`.
    ///
    /// `observer` runs at most once.  It never runs if the subscription is
    /// cancelled before the outcome is ready.
    pub fn subscribe<F>(self, observer: F) -> Subscription
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        let task = tokio::spawn(async move {
            match self.until_cancelled(&child).await {
                Some(outcome) => observer(outcome),
                None => debug!("subscription cancelled before delivery"),
            }
        });
        Subscription { token, task }
    }
}

impl<T> Future for Single<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for Single<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Single").finish_non_exhaustive()
    }
}

/// Handle to a [`Single`] running under [`Single::subscribe`].
///
/// Dropping the handle does not cancel the call; use
/// [`cancel`][Self::cancel].
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Subscription {
    /// `true` once the outcome was delivered or the call was cancelled.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Request cancellation without waiting for cleanup.
    pub fn dispose(&self) {
        self.token.cancel();
    }

    /// Cancel the call and wait until its connection has been closed.
    ///
    /// If the outcome was already delivered this only waits for the task.
    pub async fn cancel(self) {
        self.token.cancel();
        self.join().await;
    }

    /// Wait for the call to finish (delivered or cancelled).
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "subscription task ended abnormally");
        }
    }
}
