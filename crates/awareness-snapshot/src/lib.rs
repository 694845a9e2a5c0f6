//! `awareness-snapshot` – the device's current context, one value at a time
//!
//! Each feature (location, activity, headphones) is a thin mapping over
//! [`SingleShotRequestAdapter`][awareness_core::SingleShotRequestAdapter]: a
//! guard check, one host query, one projection.
//!
//! # Modules
//!
//! - [`model`] – the values features return ([`Location`][model::Location],
//!   [`ActivityRecognition`][model::ActivityRecognition], …).
//! - [`api`] – [`SnapshotApi`][api::SnapshotApi]: the host's request API and
//!   its raw query/response types.
//! - [`projection`] – pure functions from raw responses to feature values.
//! - [`snapshot`] – [`Snapshot`][snapshot::Snapshot]: the public accessor.
//! - [`sim`] – [`SimulatedHost`][sim::SimulatedHost]: scriptable in-process
//!   host for tests and the CLI.

pub mod api;
pub mod model;
pub mod projection;
pub mod sim;
pub mod snapshot;

pub use api::{QueryKind, RequestId, SnapshotApi, SnapshotQuery, SnapshotResponse};
pub use model::{
    ActivityKind, ActivityRecognition, DetectedActivity, HeadphoneState, LatLng, Location,
};
pub use sim::SimulatedHost;
pub use snapshot::Snapshot;
