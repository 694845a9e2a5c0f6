//! Pure functions mapping raw [`SnapshotResponse`]s into feature values.
//!
//! A response of the wrong kind, or one whose payload is absent, is a
//! [`ProjectionError`].  The minimum-probability activity filters are the
//! exception: "nothing qualified" is a valid result, `None` for the single
//! variant and an empty list for the list variant.

use awareness_types::ProjectionError;

use crate::api::{QueryKind, SnapshotResponse};
use crate::model::{ActivityRecognition, DetectedActivity, HeadphoneState, Location};

fn unexpected(expected: QueryKind, found: &SnapshotResponse) -> ProjectionError {
    ProjectionError::UnexpectedResult {
        expected: expected.name().to_string(),
        found: found.kind().name().to_string(),
    }
}

fn absent(kind: QueryKind) -> ProjectionError {
    ProjectionError::Absent(kind.name().to_string())
}

pub fn location(response: SnapshotResponse) -> Result<Location, ProjectionError> {
    match response {
        SnapshotResponse::Location(value) => value.ok_or_else(|| absent(QueryKind::Location)),
        other => Err(unexpected(QueryKind::Location, &other)),
    }
}

pub fn activity(response: SnapshotResponse) -> Result<ActivityRecognition, ProjectionError> {
    match response {
        SnapshotResponse::DetectedActivity(value) => {
            value.ok_or_else(|| absent(QueryKind::DetectedActivity))
        }
        other => Err(unexpected(QueryKind::DetectedActivity, &other)),
    }
}

pub fn headphones_plugged_in(response: SnapshotResponse) -> Result<bool, ProjectionError> {
    match response {
        SnapshotResponse::HeadphoneState(value) => value
            .map(|state| state == HeadphoneState::PluggedIn)
            .ok_or_else(|| absent(QueryKind::HeadphoneState)),
        other => Err(unexpected(QueryKind::HeadphoneState, &other)),
    }
}

pub fn most_probable(activity: ActivityRecognition) -> Result<DetectedActivity, ProjectionError> {
    activity
        .most_probable()
        .ok_or_else(|| ProjectionError::Absent("most probable activity".to_string()))
}

/// The most probable activity, or `None` when its confidence is below
/// `minimum_probability`.
pub fn most_probable_above(
    activity: &ActivityRecognition,
    minimum_probability: u8,
) -> Option<DetectedActivity> {
    activity
        .most_probable()
        .filter(|top| activity.confidence_of(top.kind) >= minimum_probability)
}

/// Every candidate whose confidence reaches `minimum_probability`; possibly
/// empty.
pub fn probable_above(
    activity: ActivityRecognition,
    minimum_probability: u8,
) -> Vec<DetectedActivity> {
    activity
        .probable()
        .iter()
        .filter(|candidate| activity.confidence_of(candidate.kind) >= minimum_probability)
        .copied()
        .collect()
}
