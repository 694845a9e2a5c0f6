//! [`SingleShotRequestAdapter`] – connect, request, project, close.
//!
//! Turns the host's connection-scoped, callback-driven request API into a
//! [`Single`].  For every call:
//!
//! 1. open a connection against the capability;
//! 2. once ready, let the caller's request function issue the request;
//! 3. wait for the host's one result and project it (or classify the
//!    failure);
//! 4. close the connection;
//! 5. deliver the outcome.
//!
//! Cancelling (dropping the [`Single`] or cancelling its
//! [`Subscription`][crate::single::Subscription]) at any point cancels the
//! pending request if one was issued and closes the connection exactly once.
//! No retries happen here.

use std::sync::Arc;

use awareness_types::{AwarenessError, Capability, ProjectionError};
use tracing::debug;

use crate::connection::{Connection, ConnectionManager};
use crate::host::HostConnector;
use crate::request::PendingRequest;
use crate::single::Single;

/// Generic single-shot request runner shared by every feature adapter.
#[derive(Clone, Debug)]
pub struct SingleShotRequestAdapter {
    connections: ConnectionManager,
}

impl SingleShotRequestAdapter {
    pub fn new(host: Arc<dyn HostConnector>) -> Self {
        Self {
            connections: ConnectionManager::new(host),
        }
    }

    /// Build a single-shot call against `capability`.
    ///
    /// `request_fn` issues the request on a ready connection and returns its
    /// [`PendingRequest`]; `project_fn` maps the raw host result into the
    /// feature's value.  Nothing is opened until the returned [`Single`] is
    /// polled.
    ///
    /// # Errors
    ///
    /// [`AwarenessError::Configuration`] synchronously when the host does not
    /// recognize `capability`.  Every other failure is the outcome of the
    /// returned [`Single`]:
    ///
    /// - [`AwarenessError::Connection`] – the handshake failed; `request_fn`
    ///   is never called.
    /// - [`AwarenessError::Request`] – the host reported a failure status.
    /// - [`AwarenessError::Projection`] – `project_fn` rejected the result.
    pub fn run<R, T, Req, Proj>(
        &self,
        capability: Capability,
        request_fn: Req,
        project_fn: Proj,
    ) -> Result<Single<T>, AwarenessError>
    where
        R: Send + 'static,
        T: Send + 'static,
        Req: FnOnce(&Connection) -> PendingRequest<R> + Send + 'static,
        Proj: FnOnce(R) -> Result<T, ProjectionError> + Send + 'static,
    {
        self.connections.check(&capability)?;
        let connections = self.connections.clone();

        Ok(Single::new(async move {
            let mut connection = connections.open(capability)?.ready().await?;
            let mut request = request_fn(&connection);
            debug!(connection = %connection.id(), handle = ?connection.handle(), "request issued");

            let outcome = match request.outcome().await {
                Ok(raw) => project_fn(raw).map_err(AwarenessError::from),
                Err(status) => Err(AwarenessError::Request(status)),
            };
            drop(request);
            connection.close();

            debug!(connection = %connection.id(), ok = outcome.is_ok(), "request settled");
            outcome
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use awareness_types::HostStatus;
    use tokio::sync::oneshot;

    use crate::request::CompletionSlot;
    use crate::testing::{ConnectScript, HostCall, ScriptedHost};

    #[derive(Debug)]
    struct Reading {
        value: Option<f32>,
    }

    fn reading(value: f32) -> Reading {
        Reading {
            value: Some(value),
        }
    }

    fn sensing() -> Capability {
        Capability::Service("Sensing".to_string())
    }

    fn current_value(reading: Reading) -> Result<f32, ProjectionError> {
        reading.value.ok_or_else(|| ProjectionError::Absent("value".into()))
    }

    fn adapter(script: ConnectScript) -> (Arc<ScriptedHost>, SingleShotRequestAdapter) {
        let host = Arc::new(ScriptedHost::new(script));
        (host.clone(), SingleShotRequestAdapter::new(host))
    }

    /// Request function that answers immediately with `result`.
    fn answering(
        result: Result<Reading, HostStatus>,
    ) -> impl FnOnce(&Connection) -> PendingRequest<Reading> + Send + 'static {
        move |conn| {
            assert!(conn.is_ready());
            let (slot, request) = PendingRequest::channel();
            slot.complete(result);
            request
        }
    }

    #[tokio::test]
    async fn success_closes_once_before_delivery() {
        let (host, adapter) = adapter(ConnectScript::Ready);
        let single = adapter
            .run(sensing(), answering(Ok(reading(23.5))), current_value)
            .unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observed_host = Arc::clone(&host);
        single
            .subscribe(move |outcome| {
                sink.lock()
                    .unwrap()
                    .push((outcome, observed_host.close_count()));
            })
            .join()
            .await;

        assert_eq!(*seen.lock().unwrap(), vec![(Ok(23.5), 1)]);
        assert_eq!(host.open_count(), 1);
        assert_eq!(host.close_count(), 1);
    }

    #[tokio::test]
    async fn connection_failure_never_issues_request() {
        let status = HostStatus::new(16, "API_UNAVAILABLE");
        let (host, adapter) = adapter(ConnectScript::Fail(status.clone()));
        let issued = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&issued);

        let outcome = adapter
            .run(
                sensing(),
                move |_conn: &Connection| {
                    flag.store(true, Ordering::SeqCst);
                    PendingRequest::<Reading>::channel().1
                },
                current_value,
            )
            .unwrap()
            .await;

        assert_eq!(outcome, Err(AwarenessError::Connection(status)));
        assert!(!issued.load(Ordering::SeqCst));
        assert_eq!(host.close_count(), 1);
    }

    #[tokio::test]
    async fn host_failure_becomes_request_error_with_message() {
        let (host, adapter) = adapter(ConnectScript::Ready);
        let status = HostStatus::new(7, "Location unavailable");
        let outcome = adapter
            .run(sensing(), answering(Err(status.clone())), current_value)
            .unwrap()
            .await;

        match outcome {
            Err(AwarenessError::Request(reported)) => {
                assert_eq!(reported.message, "Location unavailable");
                assert_eq!(reported, status);
            }
            other => panic!("expected request error, got {other:?}"),
        }
        assert_eq!(host.close_count(), 1);
    }

    #[tokio::test]
    async fn absent_field_becomes_projection_error() {
        let (host, adapter) = adapter(ConnectScript::Ready);
        let outcome = adapter
            .run(sensing(), answering(Ok(Reading { value: None })), current_value)
            .unwrap()
            .await;
        assert_eq!(
            outcome,
            Err(AwarenessError::Projection(ProjectionError::Absent("value".into())))
        );
        assert_eq!(host.close_count(), 1);
    }

    #[test]
    fn unknown_capability_fails_before_any_connection() {
        let (host, adapter) = adapter(ConnectScript::Ready);
        let result = adapter.run(
            Capability::Service("Teleport".into()),
            answering(Ok(reading(1.0))),
            current_value,
        );
        assert!(matches!(result, Err(AwarenessError::Configuration(_))));
        assert_eq!(host.open_count(), 0);
    }

    #[tokio::test]
    async fn nothing_is_opened_until_polled() {
        let (host, adapter) = adapter(ConnectScript::Ready);
        let single = adapter
            .run(sensing(), answering(Ok(reading(1.0))), current_value)
            .unwrap();
        assert_eq!(host.open_count(), 0);
        drop(single);
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn cancel_after_issue_closes_once_and_discards_late_result() {
        let (host, adapter) = adapter(ConnectScript::Ready);
        let held: Arc<Mutex<Option<CompletionSlot<Reading>>>> = Arc::new(Mutex::new(None));
        let cancels = Arc::new(AtomicUsize::new(0));
        let (issued_tx, issued_rx) = oneshot::channel();

        let slot_store = Arc::clone(&held);
        let cancel_counter = Arc::clone(&cancels);
        let single = adapter
            .run(
                sensing(),
                move |_conn: &Connection| {
                    let (slot, request) = PendingRequest::channel();
                    *slot_store.lock().unwrap() = Some(slot);
                    let _ = issued_tx.send(());
                    request.on_cancel(move || {
                        cancel_counter.fetch_add(1, Ordering::SeqCst);
                    })
                },
                current_value,
            )
            .unwrap();

        let delivered = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&delivered);
        let sub = single.subscribe(move |_| flag.store(true, Ordering::SeqCst));

        issued_rx.await.unwrap();
        sub.cancel().await;

        assert!(!delivered.load(Ordering::SeqCst));
        assert_eq!(host.close_count(), 1);
        assert_eq!(cancels.load(Ordering::SeqCst), 1);

        // The host callback arrives late.
        let slot = held.lock().unwrap().take().unwrap();
        assert!(slot.is_abandoned());
        slot.succeed(reading(9.9));

        assert!(!delivered.load(Ordering::SeqCst));
        assert_eq!(host.close_count(), 1);
        assert_eq!(host.open_count(), 1);
    }

    #[tokio::test]
    async fn cancel_while_connecting_closes_once() {
        let (host, adapter) = adapter(ConnectScript::Hold);
        let issued = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&issued);
        let single = adapter
            .run(
                sensing(),
                move |_conn: &Connection| {
                    flag.store(true, Ordering::SeqCst);
                    PendingRequest::<Reading>::channel().1
                },
                current_value,
            )
            .unwrap();

        let sub = single.subscribe(|_| panic!("must not deliver"));
        while host.open_count() == 0 {
            tokio::task::yield_now().await;
        }
        sub.cancel().await;
        assert_eq!(host.close_count(), 1);

        // Late ready neither issues the request nor closes again.
        assert_eq!(host.fire_held(), 1);
        tokio::task::yield_now().await;
        assert!(!issued.load(Ordering::SeqCst));
        assert_eq!(host.close_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_runs_use_separate_connections() {
        let (host, adapter) = adapter(ConnectScript::Ready);
        let a = adapter
            .run(sensing(), answering(Ok(reading(1.0))), current_value)
            .unwrap();
        let b = adapter
            .run(sensing(), answering(Ok(reading(2.0))), current_value)
            .unwrap();

        let (ra, rb) = tokio::join!(a, b);
        assert_eq!((ra, rb), (Ok(1.0), Ok(2.0)));

        let calls = host.calls();
        let opened: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Open(_, h) => Some(*h),
                _ => None,
            })
            .collect();
        assert_eq!(opened.len(), 2);
        assert_ne!(opened[0], opened[1]);
        for handle in opened {
            let closes = calls.iter().filter(|c| **c == HostCall::Close(handle)).count();
            assert_eq!(closes, 1);
        }
    }

    #[tokio::test]
    async fn open_precedes_close_in_host_log() {
        let (host, adapter) = adapter(ConnectScript::Ready);
        adapter
            .run(sensing(), answering(Ok(reading(4.0))), current_value)
            .unwrap()
            .await
            .unwrap();
        let calls = host.calls();
        assert!(matches!(calls[0], HostCall::Open(_, _)));
        assert!(matches!(calls[1], HostCall::Close(_)));
        assert_eq!(calls.len(), 2);
    }
}
