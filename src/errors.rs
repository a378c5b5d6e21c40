//! Error types for camera lifecycle orchestration
//!
//! `CameraError` is what a camera access provider reports when a start, stop
//! or capture fails. `ControllerError` covers failures of the controller
//! surface itself.

use serde::Serialize;
use std::fmt;

/// Taxonomy the provider-reported error names are mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CameraErrorKind {
    /// The user or platform refused camera access
    PermissionDenied,
    /// No camera matching the request is present
    DeviceUnavailable,
    /// The requested facing mode or resolution cannot be satisfied
    ConstraintUnsatisfiable,
    /// The device exists but another consumer holds it
    AlreadyInUse,
    Unknown,
}

impl CameraErrorKind {
    /// Map a provider error name onto the taxonomy
    pub fn from_name(name: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
                CameraErrorKind::PermissionDenied
            }
            "NotFoundError" | "DevicesNotFoundError" => CameraErrorKind::DeviceUnavailable,
            "OverconstrainedError" | "ConstraintNotSatisfiedError" | "TypeError" => {
                CameraErrorKind::ConstraintUnsatisfiable
            }
            "NotReadableError" | "TrackStartError" | "AbortError" => CameraErrorKind::AlreadyInUse,
            _ => CameraErrorKind::Unknown,
        }
    }

    /// Name a provider would report for this kind
    pub fn canonical_name(&self) -> &'static str {
        match self {
            CameraErrorKind::PermissionDenied => "NotAllowedError",
            CameraErrorKind::DeviceUnavailable => "NotFoundError",
            CameraErrorKind::ConstraintUnsatisfiable => "OverconstrainedError",
            CameraErrorKind::AlreadyInUse => "NotReadableError",
            CameraErrorKind::Unknown => "Error",
        }
    }
}

impl fmt::Display for CameraErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraErrorKind::PermissionDenied => write!(f, "permission denied"),
            CameraErrorKind::DeviceUnavailable => write!(f, "device unavailable"),
            CameraErrorKind::ConstraintUnsatisfiable => write!(f, "constraint unsatisfiable"),
            CameraErrorKind::AlreadyInUse => write!(f, "already in use"),
            CameraErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Failure reported by a camera access provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{name} {message}")]
pub struct CameraError {
    /// Provider error name, e.g. `NotAllowedError`
    pub name: String,
    pub message: String,
}

impl CameraError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn from_kind(kind: CameraErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind.canonical_name(), message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::from_kind(CameraErrorKind::PermissionDenied, message)
    }

    pub fn device_unavailable(message: impl Into<String>) -> Self {
        Self::from_kind(CameraErrorKind::DeviceUnavailable, message)
    }

    pub fn constraint_unsatisfiable(message: impl Into<String>) -> Self {
        Self::from_kind(CameraErrorKind::ConstraintUnsatisfiable, message)
    }

    pub fn already_in_use(message: impl Into<String>) -> Self {
        Self::from_kind(CameraErrorKind::AlreadyInUse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::from_kind(CameraErrorKind::Unknown, message)
    }

    pub fn kind(&self) -> CameraErrorKind {
        CameraErrorKind::from_name(&self.name)
    }

    /// Inline error text shown when a start fails: `"<name> <message>"`
    pub fn display_message(&self) -> String {
        format!("{} {}", self.name, self.message)
    }
}

/// Failures of the controller surface
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("camera controller has been torn down")]
    TornDown,
    #[error("no tokio runtime available to drive the camera controller")]
    NoRuntime,
    #[error("capture failed: {0}")]
    Capture(#[from] CameraError),
    #[error("invalid camera props: {0}")]
    InvalidProps(String),
    #[error("config file I/O failed: {0}")]
    ConfigIo(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
