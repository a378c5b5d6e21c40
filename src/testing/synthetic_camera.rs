//! In-memory camera access provider
//!
//! Records every call it receives and can be scripted to fail or to delay
//! completion, which makes lifecycle sequencing observable in tests.

use super::synthetic_data::{encode_frame, scaled_dimension, synthetic_video_frame};
use crate::errors::CameraError;
use crate::provider::CameraAccessProvider;
use crate::types::{CaptureConfig, EncodedImage, FacingMode, MediaStream, Resolution};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Stream size when no resolution hint is given
pub const DEFAULT_STREAM_RESOLUTION: Resolution = Resolution {
    width: 640,
    height: 480,
};

/// Largest stream the synthetic device produces
pub const MAX_STREAM_RESOLUTION: Resolution = Resolution {
    width: 1920,
    height: 1080,
};

/// Largest still the synthetic device encodes
pub const MAX_CAPTURE_RESOLUTION: Resolution = Resolution {
    width: 7680,
    height: 4320,
};

/// One call received by the provider
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    StartWithResolution {
        facing_mode: Option<FacingMode>,
        resolution: Option<Resolution>,
    },
    StartWithMaxResolution {
        facing_mode: Option<FacingMode>,
    },
    Stop,
    Capture(CaptureConfig),
}

impl ProviderCall {
    pub fn is_start(&self) -> bool {
        matches!(
            self,
            ProviderCall::StartWithResolution { .. } | ProviderCall::StartWithMaxResolution { .. }
        )
    }
}

#[derive(Debug, Default)]
struct SyntheticState {
    active: Option<MediaStream>,
    calls: Vec<ProviderCall>,
    start_failures: VecDeque<CameraError>,
    stop_failures: VecDeque<CameraError>,
    start_delay: Duration,
    stop_delay: Duration,
    frames_captured: u64,
}

#[derive(Debug, Default)]
pub struct SyntheticCamera {
    state: Mutex<SyntheticState>,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SyntheticState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail the next start with `error`. Queued failures apply in order.
    pub fn fail_next_start(&self, error: CameraError) {
        self.lock().start_failures.push_back(error);
    }

    pub fn fail_next_stop(&self, error: CameraError) {
        self.lock().stop_failures.push_back(error);
    }

    pub fn set_start_delay(&self, delay: Duration) {
        self.lock().start_delay = delay;
    }

    pub fn set_stop_delay(&self, delay: Duration) {
        self.lock().stop_delay = delay;
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    /// Calls excluding captures
    pub fn lifecycle_calls(&self) -> Vec<ProviderCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| !matches!(call, ProviderCall::Capture(_)))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn active_stream(&self) -> Option<MediaStream> {
        self.lock().active.clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.lock().active.is_some()
    }

    fn record(&self, call: ProviderCall) {
        self.lock().calls.push(call);
    }

    fn open_stream(
        &self,
        facing_mode: Option<FacingMode>,
        resolution: Resolution,
    ) -> Result<MediaStream, CameraError> {
        let mut state = self.lock();
        if let Some(error) = state.start_failures.pop_front() {
            return Err(error);
        }
        if !resolution.is_valid() {
            return Err(CameraError::constraint_unsatisfiable(format!(
                "cannot satisfy resolution {}",
                resolution
            )));
        }

        let stream = MediaStream::new(
            facing_mode,
            resolution.width.min(MAX_STREAM_RESOLUTION.width),
            resolution.height.min(MAX_STREAM_RESOLUTION.height),
        );
        state.active = Some(stream.clone());
        Ok(stream)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

impl CameraAccessProvider for SyntheticCamera {
    async fn start_with_resolution(
        &self,
        facing_mode: Option<FacingMode>,
        resolution: Option<Resolution>,
    ) -> Result<MediaStream, CameraError> {
        self.record(ProviderCall::StartWithResolution {
            facing_mode,
            resolution,
        });
        let delay = self.lock().start_delay;
        pause(delay).await;
        self.open_stream(facing_mode, resolution.unwrap_or(DEFAULT_STREAM_RESOLUTION))
    }

    async fn start_with_max_resolution(
        &self,
        facing_mode: Option<FacingMode>,
    ) -> Result<MediaStream, CameraError> {
        self.record(ProviderCall::StartWithMaxResolution { facing_mode });
        let delay = self.lock().start_delay;
        pause(delay).await;
        self.open_stream(facing_mode, MAX_STREAM_RESOLUTION)
    }

    async fn stop(&self) -> Result<(), CameraError> {
        self.record(ProviderCall::Stop);
        let delay = self.lock().stop_delay;
        pause(delay).await;

        let mut state = self.lock();
        if let Some(error) = state.stop_failures.pop_front() {
            return Err(error);
        }
        state.active = None;
        Ok(())
    }

    fn capture(&self, config: &CaptureConfig) -> Result<EncodedImage, CameraError> {
        let (stream, frame_number) = {
            let mut state = self.lock();
            state.calls.push(ProviderCall::Capture(*config));
            let stream = state.active.clone().ok_or_else(|| {
                CameraError::new("InvalidStateError", "no active video stream to capture from")
            })?;
            state.frames_captured += 1;
            (stream, state.frames_captured)
        };

        let width = scaled_dimension(stream.width, config.size_factor);
        let height = scaled_dimension(stream.height, config.size_factor);
        if width > MAX_CAPTURE_RESOLUTION.width || height > MAX_CAPTURE_RESOLUTION.height {
            return Err(CameraError::constraint_unsatisfiable(format!(
                "capture of {}x{} exceeds {}",
                width, height, MAX_CAPTURE_RESOLUTION
            )));
        }

        encode_frame(synthetic_video_frame(frame_number, width, height), config)
    }
}
