use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A service the host environment can open a connection against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// The context-sensing service backing every snapshot feature.
    Awareness,
    /// Any other host service, addressed by name (e.g. "Sensing").
    Service(String),
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Awareness => write!(f, "awareness"),
            Capability::Service(name) => write!(f, "{name}"),
        }
    }
}

/// API keys a feature may require before the host will serve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKey {
    Awareness,
}

impl ApiKey {
    /// Metadata name the key is declared under in the host configuration.
    pub fn meta_name(self) -> &'static str {
        match self {
            ApiKey::Awareness => "com.google.android.awareness.API_KEY",
        }
    }
}

/// Runtime permissions a feature may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    FineLocation,
    ActivityRecognition,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::FineLocation => write!(f, "android.permission.ACCESS_FINE_LOCATION"),
            Permission::ActivityRecognition => {
                write!(f, "com.google.android.gms.permission.ACTIVITY_RECOGNITION")
            }
        }
    }
}

/// Status reported by the host environment alongside a failed connect or
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStatus {
    pub code: i32,
    pub message: String,
}

impl HostStatus {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Failure to map a raw host result into a feature's value type.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectionError {
    #[error("{0} is absent from the host result")]
    Absent(String),

    #[error("expected a {expected} result, host returned {found}")]
    UnexpectedResult {
        expected: String,
        found: String,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Classified failure of a single-shot sensing call.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AwarenessError {
    #[error("Configuration Error: {0}")]
    Configuration(String),

    #[error("Connection Failed: {0}")]
    Connection(HostStatus),

    #[error("Request Failed: {0}")]
    Request(HostStatus),

    #[error("Projection Failed: {0}")]
    Projection(#[from] ProjectionError),
}

impl AwarenessError {
    /// `true` for errors raised synchronously before any connection attempt.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AwarenessError::Configuration(_))
    }
}

/// The single terminal result of one asynchronous sensing call.
pub type Outcome<T> = Result<T, AwarenessError>;

/// Result of a synchronous precondition check.
pub type GuardResult = Result<(), AwarenessError>;
