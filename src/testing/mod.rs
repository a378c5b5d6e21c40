//! Testing utilities for crabshot
//!
//! A synthetic camera provider plus recorders for callbacks and shutter
//! clicks, enabling controller tests and demos without camera hardware.

pub mod recorder;
pub mod synthetic_camera;
pub mod synthetic_data;

pub use recorder::{EventRecorder, RecordedEvent, RecordingShutter};
pub use synthetic_camera::{
    ProviderCall, SyntheticCamera, DEFAULT_STREAM_RESOLUTION, MAX_CAPTURE_RESOLUTION,
    MAX_STREAM_RESOLUTION,
};
pub use synthetic_data::{encode_frame, synthetic_video_frame};
