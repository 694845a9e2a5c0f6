//! [`Snapshot`] – one single-shot call per context feature.
//!
//! Every method checks the feature's [`FeatureRequirements`] synchronously,
//! then hands the host query and its projection to the
//! [`SingleShotRequestAdapter`].  The returned [`Single`] resolves to exactly
//! one value or one classified error.
//!
//! | Method | Value | Requires |
//! |---|---|---|
//! | [`location`][Snapshot::location] and derived | [`Location`] | fine location, Awareness key |
//! | [`activity`][Snapshot::activity] and derived | [`ActivityRecognition`] | activity recognition, Awareness key |
//! | [`headphones_plugged_in`][Snapshot::headphones_plugged_in] | `bool` | Awareness key |

use std::sync::Arc;

use awareness_core::{Connection, HostConnector, PendingRequest, Single, SingleShotRequestAdapter};
use awareness_guard::{FeatureRequirements, PolicyGate};
use awareness_types::{ApiKey, AwarenessError, Capability, Permission, ProjectionError};

use crate::api::{SnapshotApi, SnapshotQuery, SnapshotResponse};
use crate::model::{ActivityRecognition, DetectedActivity, LatLng, Location};
use crate::projection;

pub const LOCATION: FeatureRequirements = FeatureRequirements {
    feature: "location",
    permissions: &[Permission::FineLocation],
    api_keys: &[ApiKey::Awareness],
};

pub const ACTIVITY: FeatureRequirements = FeatureRequirements {
    feature: "activity",
    permissions: &[Permission::ActivityRecognition],
    api_keys: &[ApiKey::Awareness],
};

pub const HEADPHONES: FeatureRequirements = FeatureRequirements {
    feature: "headphones",
    permissions: &[],
    api_keys: &[ApiKey::Awareness],
};

/// Accessor for the current context of the device.
#[derive(Clone)]
pub struct Snapshot {
    adapter: SingleShotRequestAdapter,
    api: Arc<dyn SnapshotApi>,
    gate: PolicyGate,
}

impl Snapshot {
    /// Build a snapshot accessor over a host that provides both the
    /// connection and the snapshot request API.
    pub fn new<H>(host: Arc<H>, gate: PolicyGate) -> Self
    where
        H: HostConnector + SnapshotApi + 'static,
    {
        Self {
            adapter: SingleShotRequestAdapter::new(host.clone()),
            api: host,
            gate,
        }
    }

    fn query<T, P>(
        &self,
        requirements: &FeatureRequirements,
        query: SnapshotQuery,
        project: P,
    ) -> Result<Single<T>, AwarenessError>
    where
        T: Send + 'static,
        P: FnOnce(SnapshotResponse) -> Result<T, ProjectionError> + Send + 'static,
    {
        self.gate.check(requirements)?;
        let api = Arc::clone(&self.api);
        self.adapter.run(
            Capability::Awareness,
            move |conn: &Connection| {
                let (slot, request) = PendingRequest::channel();
                let id = api.issue(conn.handle(), query, slot);
                request.on_cancel(move || api.cancel(id))
            },
            project,
        )
    }

    // ── Location ───────────────────────────────────────────────────────────

    pub fn location(&self) -> Result<Single<Location>, AwarenessError> {
        self.query(&LOCATION, SnapshotQuery::Location, projection::location)
    }

    pub fn lat_lng(&self) -> Result<Single<LatLng>, AwarenessError> {
        Ok(self.location()?.map(|l| l.lat_lng()))
    }

    /// Current speed in metres per second.
    pub fn speed(&self) -> Result<Single<f32>, AwarenessError> {
        Ok(self.location()?.map(|l| l.speed))
    }

    // ── Activity ───────────────────────────────────────────────────────────

    pub fn activity(&self) -> Result<Single<ActivityRecognition>, AwarenessError> {
        self.query(&ACTIVITY, SnapshotQuery::DetectedActivity, projection::activity)
    }

    pub fn most_probable_activity(&self) -> Result<Single<DetectedActivity>, AwarenessError> {
        Ok(self.activity()?.try_map(projection::most_probable))
    }

    /// The most probable activity if its confidence reaches
    /// `minimum_probability`, `None` otherwise.
    pub fn most_probable_activity_above(
        &self,
        minimum_probability: u8,
    ) -> Result<Single<Option<DetectedActivity>>, AwarenessError> {
        Ok(self
            .activity()?
            .map(move |a| projection::most_probable_above(&a, minimum_probability)))
    }

    pub fn probable_activities(&self) -> Result<Single<Vec<DetectedActivity>>, AwarenessError> {
        Ok(self.activity()?.map(ActivityRecognition::into_probable))
    }

    /// Every candidate activity whose confidence reaches
    /// `minimum_probability`.  Empty when none does.
    pub fn probable_activities_above(
        &self,
        minimum_probability: u8,
    ) -> Result<Single<Vec<DetectedActivity>>, AwarenessError> {
        Ok(self
            .activity()?
            .map(move |a| projection::probable_above(a, minimum_probability)))
    }

    // ── Headphones ─────────────────────────────────────────────────────────

    pub fn headphones_plugged_in(&self) -> Result<Single<bool>, AwarenessError> {
        self.query(
            &HEADPHONES,
            SnapshotQuery::HeadphoneState,
            projection::headphones_plugged_in,
        )
    }
}
