//! Scripted in-memory host used by the unit tests of this crate.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use awareness_types::{Capability, HostStatus};

use crate::host::{ConnectSignal, HostConnector, HostHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostCall {
    Open(Capability, HostHandle),
    Close(HostHandle),
}

/// How the host answers each connect handshake.
#[derive(Debug, Clone)]
pub(crate) enum ConnectScript {
    Ready,
    Fail(HostStatus),
    /// Keep the signal; fire it later with [`ScriptedHost::fire_held`].
    Hold,
    /// Drop the signal without firing.
    Drop,
}

pub(crate) struct ScriptedHost {
    script: ConnectScript,
    calls: Mutex<Vec<HostCall>>,
    held: Mutex<Vec<ConnectSignal>>,
    next_handle: AtomicU64,
}

impl ScriptedHost {
    pub(crate) fn new(script: ConnectScript) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    pub(crate) fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn open_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, HostCall::Open(..)))
            .count()
    }

    pub(crate) fn close_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, HostCall::Close(_)))
            .count()
    }

    /// Fire every held signal as ready, returning how many were fired.
    pub(crate) fn fire_held(&self) -> usize {
        let held: Vec<ConnectSignal> = self.held.lock().unwrap().drain(..).collect();
        let n = held.len();
        for signal in held {
            signal.ready();
        }
        n
    }
}

impl HostConnector for ScriptedHost {
    fn recognizes(&self, capability: &Capability) -> bool {
        match capability {
            Capability::Awareness => true,
            Capability::Service(name) => name == "Sensing",
        }
    }

    fn open(&self, capability: &Capability, signal: ConnectSignal) -> HostHandle {
        let handle = HostHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Open(capability.clone(), handle));
        match &self.script {
            ConnectScript::Ready => signal.ready(),
            ConnectScript::Fail(status) => signal.failed(status.clone()),
            ConnectScript::Hold => self.held.lock().unwrap().push(signal),
            ConnectScript::Drop => drop(signal),
        }
        handle
    }

    fn close(&self, handle: HostHandle) {
        self.calls.lock().unwrap().push(HostCall::Close(handle));
    }
}
