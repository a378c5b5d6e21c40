//! Notification sink: optional callbacks fired on lifecycle and capture events

use crate::errors::CameraError;
use crate::types::{EncodedImage, MediaStream};
use std::fmt;
use std::sync::Arc;

type StreamCallback = Arc<dyn Fn(&MediaStream) + Send + Sync>;
type StopCallback = Arc<dyn Fn() + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&CameraError) + Send + Sync>;
type ImageCallback = Arc<dyn Fn(&EncodedImage) + Send + Sync>;

/// Callbacks the embedding application supplies. Each one is invoked only if set.
#[derive(Clone, Default)]
pub struct CameraCallbacks {
    on_camera_start: Option<StreamCallback>,
    on_camera_stop: Option<StopCallback>,
    on_camera_error: Option<ErrorCallback>,
    on_take_photo: Option<ImageCallback>,
    on_take_photo_animation_done: Option<ImageCallback>,
}

impl CameraCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_camera_start(mut self, f: impl Fn(&MediaStream) + Send + Sync + 'static) -> Self {
        self.on_camera_start = Some(Arc::new(f));
        self
    }

    pub fn on_camera_stop(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_camera_stop = Some(Arc::new(f));
        self
    }

    pub fn on_camera_error(mut self, f: impl Fn(&CameraError) + Send + Sync + 'static) -> Self {
        self.on_camera_error = Some(Arc::new(f));
        self
    }

    pub fn on_take_photo(mut self, f: impl Fn(&EncodedImage) + Send + Sync + 'static) -> Self {
        self.on_take_photo = Some(Arc::new(f));
        self
    }

    /// Fired when the captured image is replaced by the live video again
    pub fn on_take_photo_animation_done(
        mut self,
        f: impl Fn(&EncodedImage) + Send + Sync + 'static,
    ) -> Self {
        self.on_take_photo_animation_done = Some(Arc::new(f));
        self
    }

    pub(crate) fn camera_started(&self, stream: &MediaStream) {
        if let Some(cb) = &self.on_camera_start {
            cb(stream);
        }
    }

    pub(crate) fn camera_stopped(&self) {
        if let Some(cb) = &self.on_camera_stop {
            cb();
        }
    }

    pub(crate) fn camera_error(&self, error: &CameraError) {
        if let Some(cb) = &self.on_camera_error {
            cb(error);
        }
    }

    pub(crate) fn photo_taken(&self, image: &EncodedImage) {
        if let Some(cb) = &self.on_take_photo {
            cb(image);
        }
    }

    pub(crate) fn photo_animation_done(&self, image: &EncodedImage) {
        if let Some(cb) = &self.on_take_photo_animation_done {
            cb(image);
        }
    }
}

impl fmt::Debug for CameraCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraCallbacks")
            .field("on_camera_start", &self.on_camera_start.is_some())
            .field("on_camera_stop", &self.on_camera_stop.is_some())
            .field("on_camera_error", &self.on_camera_error.is_some())
            .field("on_take_photo", &self.on_take_photo.is_some())
            .field(
                "on_take_photo_animation_done",
                &self.on_take_photo_animation_done.is_some(),
            )
            .finish()
    }
}
