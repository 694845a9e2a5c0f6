//! One in-flight request against a ready connection.
//!
//! [`PendingRequest::channel`] creates the two halves of a request's
//! completion: the [`CompletionSlot`] goes to the host's result callback, the
//! [`PendingRequest`] stays with the adapter and is awaited for the single
//! result.

use awareness_types::HostStatus;
use tokio::sync::oneshot;
use tracing::debug;

/// Status code used when a host drops a [`CompletionSlot`] without filling it.
pub const REQUEST_ABANDONED: i32 = -2;

type CancelHook = Box<dyn FnOnce() + Send>;

/// Receives exactly one of {raw result, failure status} from the host.
///
/// All filling methods consume the slot.  Filling a slot whose request has
/// been cancelled is a silent no-op.
#[derive(Debug)]
pub struct CompletionSlot<R> {
    tx: oneshot::Sender<Result<R, HostStatus>>,
}

impl<R> CompletionSlot<R> {
    pub fn succeed(self, raw: R) {
        self.complete(Ok(raw));
    }

    pub fn fail(self, status: HostStatus) {
        self.complete(Err(status));
    }

    pub fn complete(self, result: Result<R, HostStatus>) {
        if self.tx.send(result).is_err() {
            debug!("request callback fired after the request was dropped; discarded");
        }
    }

    /// `true` once the waiting [`PendingRequest`] has gone away.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// An issued request awaiting its one callback-delivered result.
///
/// If dropped before the result arrives, the cancel hook registered with
/// [`on_cancel`][Self::on_cancel] runs once.
pub struct PendingRequest<R> {
    rx: oneshot::Receiver<Result<R, HostStatus>>,
    cancel: Option<CancelHook>,
    settled: bool,
}

impl<R> PendingRequest<R> {
    /// Create a linked slot / request pair.
    pub fn channel() -> (CompletionSlot<R>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            CompletionSlot { tx },
            Self {
                rx,
                cancel: None,
                settled: false,
            },
        )
    }

    /// Register a best-effort cancellation for the host-side request.
    pub fn on_cancel(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.cancel = Some(Box::new(hook));
        self
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Wait for the host's single result.
    ///
    /// A slot dropped without being filled yields a status with code
    /// [`REQUEST_ABANDONED`].
    pub async fn outcome(&mut self) -> Result<R, HostStatus> {
        let result = match (&mut self.rx).await {
            Ok(result) => result,
            Err(_) => Err(HostStatus::new(
                REQUEST_ABANDONED,
                "host dropped the request callback without firing it",
            )),
        };
        self.settled = true;
        self.cancel = None;
        result
    }
}

impl<R> Drop for PendingRequest<R> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Some(cancel) = self.cancel.take() {
            debug!("cancelling unsettled request");
            cancel();
        }
    }
}
