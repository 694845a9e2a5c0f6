//! Values returned by the snapshot features.
//!
//! Only the fields the feature projections read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres per second.
    pub speed: f32,
    /// Horizontal accuracy radius in metres.
    pub accuracy: f32,
    pub time: DateTime<Utc>,
}

impl Location {
    pub fn lat_lng(&self) -> LatLng {
        LatLng {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    InVehicle,
    OnBicycle,
    OnFoot,
    Running,
    Still,
    Tilting,
    Unknown,
    Walking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedActivity {
    pub kind: ActivityKind,
    /// Likelihood that the user is doing this activity, 0–100.
    pub confidence: u8,
}

/// The host's activity classification at one instant.
///
/// Candidates are kept in descending confidence order however they were
/// supplied, including through deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRecognition")]
pub struct ActivityRecognition {
    probable: Vec<DetectedActivity>,
    pub time: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawRecognition {
    probable: Vec<DetectedActivity>,
    time: DateTime<Utc>,
}

impl From<RawRecognition> for ActivityRecognition {
    fn from(raw: RawRecognition) -> Self {
        Self::new(raw.probable, raw.time)
    }
}

impl ActivityRecognition {
    /// Build a result, ordering the candidates by descending confidence.
    pub fn new(mut probable: Vec<DetectedActivity>, time: DateTime<Utc>) -> Self {
        probable.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        Self { probable, time }
    }

    /// Candidates, most probable first.
    pub fn probable(&self) -> &[DetectedActivity] {
        &self.probable
    }

    pub fn into_probable(self) -> Vec<DetectedActivity> {
        self.probable
    }

    pub fn most_probable(&self) -> Option<DetectedActivity> {
        self.probable.first().copied()
    }

    /// Confidence reported for `kind`, or 0 if it is not a candidate.
    pub fn confidence_of(&self, kind: ActivityKind) -> u8 {
        self.probable
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.confidence)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadphoneState {
    PluggedIn,
    Unplugged,
}
