//! Contracts of the external collaborators the controller drives
//!
//! The controller never touches camera hardware itself. It sequences calls
//! against a `CameraAccessProvider` and asks a `ShutterSound` for the click.

use crate::errors::CameraError;
use crate::types::{CaptureConfig, EncodedImage, FacingMode, MediaStream, Resolution};
use std::future::Future;

/// Starts and stops a video stream and captures still frames from it
pub trait CameraAccessProvider: Send + Sync + 'static {
    /// Start a stream, hinting a resolution. `None` lets the device choose.
    fn start_with_resolution(
        &self,
        facing_mode: Option<FacingMode>,
        resolution: Option<Resolution>,
    ) -> impl Future<Output = Result<MediaStream, CameraError>> + Send;

    /// Start a stream at the highest resolution the device supports
    fn start_with_max_resolution(
        &self,
        facing_mode: Option<FacingMode>,
    ) -> impl Future<Output = Result<MediaStream, CameraError>> + Send;

    fn stop(&self) -> impl Future<Output = Result<(), CameraError>> + Send;

    /// Encode the current frame of the active stream.
    ///
    /// Synchronous; fails when no stream is active.
    fn capture(&self, config: &CaptureConfig) -> Result<EncodedImage, CameraError>;
}

/// Plays the shutter click on capture
pub trait ShutterSound: Send + Sync {
    fn play(&self);
}

/// Shutter that only leaves a trace in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggedShutter;

impl ShutterSound for LoggedShutter {
    fn play(&self) {
        log::debug!("Shutter click");
    }
}
