//! The host environment's connection API, as consumed by the core.
//!
//! The platform sensing service hands out stateful client connections:
//! callers ask it to open one against a [`Capability`], then wait for either
//! an "on ready" or an "on failed" callback.  In Rust the two callbacks are
//! folded into a single [`ConnectSignal`] whose firing methods consume it, so
//! a host can report the outcome of a handshake at most once.

use awareness_types::{Capability, HostStatus};
use tokio::sync::oneshot;
use tracing::debug;

/// Status code used when a host drops a [`ConnectSignal`] without firing it.
pub const CONNECT_SIGNAL_DROPPED: i32 = -1;

/// Opaque identifier a host assigns to a client connection it opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostHandle(pub u64);

/// What the host reported at the end of a connect handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectEvent {
    Ready,
    Failed(HostStatus),
}

/// One-shot "on ready" / "on failed" callback pair handed to
/// [`HostConnector::open`].
///
/// Firing after the waiting side has gone away (the caller cancelled, the
/// connection was closed) is silently discarded.
#[derive(Debug)]
pub struct ConnectSignal {
    tx: oneshot::Sender<ConnectEvent>,
}

impl ConnectSignal {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<ConnectEvent>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Report that the connection is ready for requests.
    pub fn ready(self) {
        self.fire(ConnectEvent::Ready);
    }

    /// Report that the connection could not be established.
    pub fn failed(self, status: HostStatus) {
        self.fire(ConnectEvent::Failed(status));
    }

    /// `true` once nobody is waiting for this handshake any more.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }

    fn fire(self, event: ConnectEvent) {
        if let Err(late) = self.tx.send(event) {
            debug!(event = ?late, "connect callback fired after the caller went away; discarded");
        }
    }
}

/// Connection half of the host environment API.
///
/// Implementations wrap the platform's client object: [`open`][Self::open]
/// starts the handshake and must eventually fire the supplied signal (or drop
/// it), [`close`][Self::close] releases whatever the host allocated for the
/// handle.
pub trait HostConnector: Send + Sync {
    /// Whether the host knows how to connect to `capability` at all.
    fn recognizes(&self, capability: &Capability) -> bool;

    /// Begin a connect handshake against `capability`.
    fn open(&self, capability: &Capability, signal: ConnectSignal) -> HostHandle;

    /// Release the connection identified by `handle`.
    fn close(&self, handle: HostHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_is_delivered_to_waiter() {
        let (signal, rx) = ConnectSignal::channel();
        signal.ready();
        assert_eq!(rx.await.unwrap(), ConnectEvent::Ready);
    }

    #[tokio::test]
    async fn failure_carries_host_status() {
        let (signal, rx) = ConnectSignal::channel();
        signal.failed(HostStatus::new(17, "API_UNAVAILABLE"));
        assert_eq!(
            rx.await.unwrap(),
            ConnectEvent::Failed(HostStatus::new(17, "API_UNAVAILABLE"))
        );
    }

    #[test]
    fn firing_after_waiter_dropped_is_discarded() {
        let (signal, rx) = ConnectSignal::channel();
        drop(rx);
        assert!(signal.is_abandoned());
        // Must not panic.
        signal.ready();
    }
}
