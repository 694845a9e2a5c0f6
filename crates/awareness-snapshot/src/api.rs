//! The host's snapshot request API.
//!
//! A [`SnapshotApi`] issues one [`SnapshotQuery`] on an open connection and
//! later fills the supplied [`CompletionSlot`] with a [`SnapshotResponse`] or
//! a failure status.  Responses mirror the platform's result objects: the
//! payload may be absent even on success.

use awareness_core::{CompletionSlot, HostHandle};

use crate::model::{ActivityRecognition, HeadphoneState, Location};

/// Discriminant shared by [`SnapshotQuery`] and [`SnapshotResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Location,
    DetectedActivity,
    HeadphoneState,
}

impl QueryKind {
    pub fn name(self) -> &'static str {
        match self {
            QueryKind::Location => "location",
            QueryKind::DetectedActivity => "detected activity",
            QueryKind::HeadphoneState => "headphone state",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotQuery {
    Location,
    DetectedActivity,
    HeadphoneState,
}

impl SnapshotQuery {
    pub fn kind(&self) -> QueryKind {
        match self {
            SnapshotQuery::Location => QueryKind::Location,
            SnapshotQuery::DetectedActivity => QueryKind::DetectedActivity,
            SnapshotQuery::HeadphoneState => QueryKind::HeadphoneState,
        }
    }
}

/// Raw host result for a [`SnapshotQuery`].
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotResponse {
    Location(Option<Location>),
    DetectedActivity(Option<ActivityRecognition>),
    HeadphoneState(Option<HeadphoneState>),
}

impl SnapshotResponse {
    pub fn kind(&self) -> QueryKind {
        match self {
            SnapshotResponse::Location(_) => QueryKind::Location,
            SnapshotResponse::DetectedActivity(_) => QueryKind::DetectedActivity,
            SnapshotResponse::HeadphoneState(_) => QueryKind::HeadphoneState,
        }
    }
}

/// Host-assigned identifier of an issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

/// Request half of the host environment API.
pub trait SnapshotApi: Send + Sync {
    /// Issue `query` on the connection identified by `handle`.  The host must
    /// fill `slot` at most once.
    fn issue(
        &self,
        handle: HostHandle,
        query: SnapshotQuery,
        slot: CompletionSlot<SnapshotResponse>,
    ) -> RequestId;

    /// Best-effort cancellation of an issued request.
    fn cancel(&self, _request: RequestId) {}
}
