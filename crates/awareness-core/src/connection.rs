//! [`ConnectionManager`] – opens, tracks and closes host connections.
//!
//! Every single-shot call gets its own [`Connection`].  The manager turns the
//! host's callback-driven handshake into a [`PendingConnection`] that resolves
//! to a `Ready` connection or a [`AwarenessError::Connection`].
//!
//! # Lifecycle
//!
//! ```text
//! Connecting ──► Ready ──► Closed
//!      │                     ▲
//!      └──────► Failed ──────┘
//! ```
//!
//! Transitions are monotonic and each edge is taken at most once.  Closing
//! releases the host handle exactly once; a second close is a no-op.  A
//! [`Connection`] closes itself on drop, so an abandoned call still releases
//! its handle.

use std::fmt;
use std::sync::Arc;

use awareness_types::{AwarenessError, Capability, GuardResult, HostStatus};
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use crate::host::{CONNECT_SIGNAL_DROPPED, ConnectEvent, ConnectSignal, HostConnector, HostHandle};

/// Lifecycle state of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Ready,
    Failed,
    Closed,
}

/// An active session with the sensing service.
pub struct Connection {
    id: Uuid,
    capability: Capability,
    handle: HostHandle,
    state: ConnectionState,
    failure: Option<HostStatus>,
    host: Arc<dyn HostConnector>,
}

impl Connection {
    fn connecting(
        capability: Capability,
        handle: HostHandle,
        host: Arc<dyn HostConnector>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            capability,
            handle,
            state: ConnectionState::Connecting,
            failure: None,
            host,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// Host handle to issue requests against.
    pub fn handle(&self) -> HostHandle {
        self.handle
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The reason reported by the host if the handshake failed.
    pub fn failure(&self) -> Option<&HostStatus> {
        self.failure.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::Ready
    }

    fn mark_ready(&mut self) {
        if self.state == ConnectionState::Connecting {
            self.state = ConnectionState::Ready;
            debug!(connection = %self.id, capability = %self.capability, "connection ready");
        }
    }

    fn mark_failed(&mut self, status: HostStatus) {
        if self.state == ConnectionState::Connecting {
            debug!(
                connection = %self.id,
                capability = %self.capability,
                %status,
                "connection failed"
            );
            self.state = ConnectionState::Failed;
            self.failure = Some(status);
        }
    }

    /// Close the connection and release the host handle.
    ///
    /// Safe to call from any state; only the first call reaches the host.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        let from = self.state;
        self.state = ConnectionState::Closed;
        self.host.close(self.handle);
        debug!(connection = %self.id, ?from, "connection closed");
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("capability", &self.capability)
            .field("handle", &self.handle)
            .field("state", &self.state)
            .field("failure", &self.failure)
            .finish()
    }
}

/// A connect handshake that has been started but not yet resolved.
///
/// Dropping it before [`ready`][Self::ready] completes closes the underlying
/// connection.
pub struct PendingConnection {
    connection: Connection,
    events: oneshot::Receiver<ConnectEvent>,
}

impl PendingConnection {
    /// The connection as it currently stands (always `Connecting` until
    /// [`ready`][Self::ready] is awaited).
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Wait for the host to finish the handshake.
    ///
    /// No timeout is imposed here; wrap the future in
    /// [`tokio::time::timeout`] to bound it.
    ///
    /// # Errors
    ///
    /// [`AwarenessError::Connection`] with the host status when the handshake
    /// fails or the host drops the signal without firing it.  The connection
    /// has already been closed when the error is returned.
    pub async fn ready(self) -> Result<Connection, AwarenessError> {
        let PendingConnection {
            mut connection,
            events,
        } = self;

        let event = events.await.unwrap_or_else(|_| {
            ConnectEvent::Failed(HostStatus::new(
                CONNECT_SIGNAL_DROPPED,
                "host dropped the connect callbacks without firing them",
            ))
        });

        match event {
            ConnectEvent::Ready => {
                connection.mark_ready();
                Ok(connection)
            }
            ConnectEvent::Failed(status) => {
                connection.mark_failed(status.clone());
                connection.close();
                Err(AwarenessError::Connection(status))
            }
        }
    }
}

/// Owns the lifecycle of connections to the sensing service.
///
/// Cloning is cheap; clones share the same host.
#[derive(Clone)]
pub struct ConnectionManager {
    host: Arc<dyn HostConnector>,
}

impl ConnectionManager {
    pub fn new(host: Arc<dyn HostConnector>) -> Self {
        Self { host }
    }

    /// Fail fast when the host does not recognize `capability`.
    pub fn check(&self, capability: &Capability) -> GuardResult {
        if self.host.recognizes(capability) {
            Ok(())
        } else {
            Err(AwarenessError::Configuration(format!(
                "capability '{capability}' is not recognized by the host"
            )))
        }
    }

    /// Start a connect handshake against `capability`.
    ///
    /// # Errors
    ///
    /// [`AwarenessError::Configuration`] immediately, without contacting the
    /// host, when the capability is unknown.
    pub fn open(&self, capability: Capability) -> Result<PendingConnection, AwarenessError> {
        self.check(&capability)?;
        let (signal, events) = ConnectSignal::channel();
        let handle = self.host.open(&capability, signal);
        let connection = Connection::connecting(capability, handle, Arc::clone(&self.host));
        debug!(
            connection = %connection.id,
            capability = %connection.capability,
            ?handle,
            "connecting"
        );
        Ok(PendingConnection { connection, events })
    }

    /// Close `connection`.  Idempotent.
    pub fn close(&self, connection: &mut Connection) {
        connection.close();
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager").finish_non_exhaustive()
    }
}
