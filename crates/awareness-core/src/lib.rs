//! `awareness-core` – connection-scoped requests as single-shot results
//!
//! The platform sensing service only answers requests on an open client
//! connection, and answers each one through a callback.  This crate turns that
//! connect → request → callback → disconnect cycle into one reusable
//! primitive.
//!
//! # Modules
//!
//! - [`host`] – [`HostConnector`][host::HostConnector]: the host's connection
//!   API, and the one-shot [`ConnectSignal`][host::ConnectSignal] it fires.
//! - [`connection`] – [`ConnectionManager`][connection::ConnectionManager]:
//!   opens connections, awaits the handshake, closes exactly once.
//! - [`request`] – [`PendingRequest`][request::PendingRequest] and its
//!   [`CompletionSlot`][request::CompletionSlot]: one in-flight call and the
//!   slot the host fills with its single result.
//! - [`adapter`] – [`SingleShotRequestAdapter`][adapter::SingleShotRequestAdapter]:
//!   the generic connect/request/project/close runner used by every feature.
//! - [`single`] – [`Single`][single::Single]: the lazy, cancellable
//!   single-value result handed back to callers.

pub mod adapter;
pub mod connection;
pub mod host;
pub mod request;
pub mod single;

#[cfg(test)]
mod testing;

pub use adapter::SingleShotRequestAdapter;
pub use connection::{Connection, ConnectionManager, ConnectionState, PendingConnection};
pub use host::{ConnectEvent, ConnectSignal, HostConnector, HostHandle};
pub use request::{CompletionSlot, PendingRequest};
pub use single::{Single, Subscription};
