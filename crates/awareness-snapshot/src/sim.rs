//! In-process simulated sensing host for tests and demos.
//!
//! [`SimulatedHost`] implements both halves of the host API
//! ([`HostConnector`] and [`SnapshotApi`]) with scripted behaviour, and keeps
//! an ordered log of every call it receives so tests can assert on lifecycle
//! ordering without a real platform service.
//!
//! # Example
//!
//! ```rust
//! use awareness_snapshot::sim::{SimConnect, SimulatedHost};
//!
//! let host = SimulatedHost::new()
//!     .with_sample_data()
//!     .with_connect(SimConnect::Ready);
//! assert_eq!(host.open_count(), 0);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use awareness_core::{CompletionSlot, ConnectSignal, HostConnector, HostHandle};
use awareness_types::{Capability, HostStatus};
use chrono::Utc;
use tracing::debug;

use crate::api::{QueryKind, RequestId, SnapshotApi, SnapshotQuery, SnapshotResponse};
use crate::model::{ActivityKind, ActivityRecognition, DetectedActivity, HeadphoneState, Location};

/// How the simulated host answers connect handshakes.
#[derive(Debug, Clone)]
pub enum SimConnect {
    Ready,
    Fail(HostStatus),
    /// Keep the signal until [`SimulatedHost::fire_held_connects`].
    Hold,
}

/// How the simulated host answers one kind of query.
#[derive(Debug, Clone)]
pub enum SimReply {
    Respond(SnapshotResponse),
    Fail(HostStatus),
    /// Keep the slot until [`SimulatedHost::complete_held`].
    Hold,
}

/// One entry in the simulated host's call log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Opened {
        handle: HostHandle,
        capability: Capability,
    },
    Ready(HostHandle),
    Issued {
        handle: HostHandle,
        request: RequestId,
        query: QueryKind,
    },
    Cancelled(RequestId),
    Closed(HostHandle),
}

/// Scriptable stand-in for the platform sensing service.
pub struct SimulatedHost {
    capabilities: HashSet<Capability>,
    connect: SimConnect,
    replies: HashMap<QueryKind, SimReply>,
    held_connects: Mutex<Vec<(HostHandle, ConnectSignal)>>,
    held_requests: Mutex<Vec<(RequestId, CompletionSlot<SnapshotResponse>)>>,
    log: Mutex<Vec<SimEvent>>,
    next_id: AtomicU64,
}

/// Status the simulator reports for queries it has no reply scripted for.
pub const STATUS_API_NOT_CONNECTED: i32 = 17;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulatedHost {
    /// A host that recognizes only [`Capability::Awareness`], connects
    /// immediately and has no replies scripted.
    pub fn new() -> Self {
        Self {
            capabilities: HashSet::from([Capability::Awareness]),
            connect: SimConnect::Ready,
            replies: HashMap::new(),
            held_connects: Mutex::new(Vec::new()),
            held_requests: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn with_connect(mut self, connect: SimConnect) -> Self {
        self.connect = connect;
        self
    }

    pub fn with_reply(mut self, kind: QueryKind, reply: SimReply) -> Self {
        self.replies.insert(kind, reply);
        self
    }

    pub fn with_response(self, response: SnapshotResponse) -> Self {
        let kind = response.kind();
        self.with_reply(kind, SimReply::Respond(response))
    }

    /// Script a plausible reply for every query kind.
    pub fn with_sample_data(self) -> Self {
        let now = Utc::now();
        self.with_response(SnapshotResponse::Location(Some(Location {
            latitude: 48.1374,
            longitude: 11.5755,
            speed: 1.3,
            accuracy: 8.0,
            time: now,
        })))
        .with_response(SnapshotResponse::DetectedActivity(Some(ActivityRecognition::new(
            vec![
                DetectedActivity {
                    kind: ActivityKind::Walking,
                    confidence: 60,
                },
                DetectedActivity {
                    kind: ActivityKind::OnFoot,
                    confidence: 25,
                },
                DetectedActivity {
                    kind: ActivityKind::Still,
                    confidence: 15,
                },
            ],
            now,
        ))))
        .with_response(SnapshotResponse::HeadphoneState(Some(HeadphoneState::Unplugged)))
    }

    pub fn events(&self) -> Vec<SimEvent> {
        lock(&self.log).clone()
    }

    pub fn open_count(&self) -> usize {
        self.count(|e| matches!(e, SimEvent::Opened { .. }))
    }

    pub fn issue_count(&self) -> usize {
        self.count(|e| matches!(e, SimEvent::Issued { .. }))
    }

    pub fn close_count(&self) -> usize {
        self.count(|e| matches!(e, SimEvent::Closed(_)))
    }

    pub fn cancel_count(&self) -> usize {
        self.count(|e| matches!(e, SimEvent::Cancelled(_)))
    }

    fn count(&self, pred: impl Fn(&SimEvent) -> bool) -> usize {
        lock(&self.log).iter().filter(|e| pred(e)).count()
    }

    /// Fire every held connect signal as ready.  Returns how many fired.
    pub fn fire_held_connects(&self) -> usize {
        let held: Vec<_> = lock(&self.held_connects).drain(..).collect();
        let n = held.len();
        for (handle, signal) in held {
            self.record(SimEvent::Ready(handle));
            signal.ready();
        }
        n
    }

    /// Fill every held request slot with `result`.  Returns how many were
    /// filled.
    pub fn complete_held(&self, result: Result<SnapshotResponse, HostStatus>) -> usize {
        let held: Vec<_> = lock(&self.held_requests).drain(..).collect();
        let n = held.len();
        for (_, slot) in held {
            slot.complete(result.clone());
        }
        n
    }

    fn record(&self, event: SimEvent) {
        debug!(?event, "simulated host");
        lock(&self.log).push(event);
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConnector for SimulatedHost {
    fn recognizes(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    fn open(&self, capability: &Capability, signal: ConnectSignal) -> HostHandle {
        let handle = HostHandle(self.next_id());
        self.record(SimEvent::Opened {
            handle,
            capability: capability.clone(),
        });
        match &self.connect {
            SimConnect::Ready => {
                self.record(SimEvent::Ready(handle));
                signal.ready();
            }
            SimConnect::Fail(status) => signal.failed(status.clone()),
            SimConnect::Hold => lock(&self.held_connects).push((handle, signal)),
        }
        handle
    }

    fn close(&self, handle: HostHandle) {
        self.record(SimEvent::Closed(handle));
    }
}

impl SnapshotApi for SimulatedHost {
    fn issue(
        &self,
        handle: HostHandle,
        query: SnapshotQuery,
        slot: CompletionSlot<SnapshotResponse>,
    ) -> RequestId {
        let request = RequestId(self.next_id());
        let kind = query.kind();
        self.record(SimEvent::Issued {
            handle,
            request,
            query: kind,
        });

        match self.replies.get(&kind) {
            Some(SimReply::Respond(response)) => slot.succeed(response.clone()),
            Some(SimReply::Fail(status)) => slot.fail(status.clone()),
            Some(SimReply::Hold) => lock(&self.held_requests).push((request, slot)),
            None => slot.fail(HostStatus::new(
                STATUS_API_NOT_CONNECTED,
                format!("no simulated reply for {}", kind.name()),
            )),
        }
        request
    }

    fn cancel(&self, request: RequestId) {
        self.record(SimEvent::Cancelled(request));
        lock(&self.held_requests).retain(|(id, _)| *id != request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awareness_core::{ConnectionManager, PendingRequest};

    #[tokio::test]
    async fn scripted_reply_fills_slot() {
        let host = SimulatedHost::new().with_sample_data();
        let (slot, mut request) = PendingRequest::channel();
        host.issue(HostHandle(1), SnapshotQuery::HeadphoneState, slot);
        assert_eq!(
            request.outcome().await,
            Ok(SnapshotResponse::HeadphoneState(Some(HeadphoneState::Unplugged)))
        );
        assert_eq!(host.issue_count(), 1);
    }

    #[tokio::test]
    async fn unscripted_query_fails_with_status() {
        let host = SimulatedHost::new();
        let (slot, mut request) = PendingRequest::channel();
        host.issue(HostHandle(1), SnapshotQuery::Location, slot);
        let status = request.outcome().await.unwrap_err();
        assert_eq!(status.code, STATUS_API_NOT_CONNECTED);
    }

    #[tokio::test]
    async fn held_reply_is_delivered_on_completion() {
        let host = SimulatedHost::new().with_reply(QueryKind::HeadphoneState, SimReply::Hold);
        let (slot, mut request) = PendingRequest::channel();
        host.issue(HostHandle(2), SnapshotQuery::HeadphoneState, slot);
        assert!(!request.is_settled());

        let reply = SnapshotResponse::HeadphoneState(Some(HeadphoneState::PluggedIn));
        assert_eq!(host.complete_held(Ok(reply.clone())), 1);
        assert_eq!(request.outcome().await, Ok(reply));
    }

    #[tokio::test]
    async fn held_connect_fires_ready_later() {
        let host = std::sync::Arc::new(SimulatedHost::new().with_connect(SimConnect::Hold));
        let pending = ConnectionManager::new(host.clone())
            .open(Capability::Awareness)
            .unwrap();
        let handle = pending.connection().handle();
        assert_eq!(host.events().len(), 1);

        assert_eq!(host.fire_held_connects(), 1);
        assert_eq!(host.events()[1], SimEvent::Ready(handle));
        assert!(pending.ready().await.unwrap().is_ready());
    }

    #[test]
    fn cancel_drops_held_slot_and_is_logged() {
        let host = SimulatedHost::new().with_reply(QueryKind::Location, SimReply::Hold);
        let (slot, _request) = PendingRequest::<SnapshotResponse>::channel();
        let id = host.issue(HostHandle(3), SnapshotQuery::Location, slot);
        host.cancel(id);
        assert_eq!(host.cancel_count(), 1);
        assert_eq!(host.complete_held(Ok(SnapshotResponse::Location(None))), 0);
    }

    #[test]
    fn only_registered_capabilities_are_recognized() {
        let host = SimulatedHost::new().with_capability(Capability::Service("Sensing".into()));
        assert!(host.recognizes(&Capability::Awareness));
        assert!(host.recognizes(&Capability::Service("Sensing".into())));
        assert!(!host.recognizes(&Capability::Service("Fences".into())));
    }
}
