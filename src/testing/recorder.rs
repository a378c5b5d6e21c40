use crate::errors::CameraError;
use crate::events::CameraCallbacks;
use crate::provider::ShutterSound;
use crate::types::{EncodedImage, MediaStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Callback invocation captured by an `EventRecorder`
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    CameraStart(MediaStream),
    CameraStop,
    CameraError(CameraError),
    TakePhoto(EncodedImage),
    TakePhotoAnimationDone(EncodedImage),
    /// Shutter played through `EventRecorder::shutter`
    ShutterPlayed,
}

/// Collects every callback fired by a controller, in order
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(events: &Arc<Mutex<Vec<RecordedEvent>>>, event: RecordedEvent) {
        events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Callbacks that append to this recorder
    pub fn callbacks(&self) -> CameraCallbacks {
        let start = self.events.clone();
        let stop = self.events.clone();
        let error = self.events.clone();
        let photo = self.events.clone();
        let done = self.events.clone();

        CameraCallbacks::new()
            .on_camera_start(move |stream| {
                Self::push(&start, RecordedEvent::CameraStart(stream.clone()))
            })
            .on_camera_stop(move || Self::push(&stop, RecordedEvent::CameraStop))
            .on_camera_error(move |e| Self::push(&error, RecordedEvent::CameraError(e.clone())))
            .on_take_photo(move |image| Self::push(&photo, RecordedEvent::TakePhoto(image.clone())))
            .on_take_photo_animation_done(move |image| {
                Self::push(&done, RecordedEvent::TakePhotoAnimationDone(image.clone()))
            })
    }

    /// Shutter that appends `ShutterPlayed` to this recorder
    pub fn shutter(&self) -> Arc<dyn ShutterSound> {
        Arc::new(RecorderShutter {
            events: self.events.clone(),
        })
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, predicate: impl Fn(&RecordedEvent) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(*event)).count()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

struct RecorderShutter {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl ShutterSound for RecorderShutter {
    fn play(&self) {
        EventRecorder::push(&self.events, RecordedEvent::ShutterPlayed);
    }
}

/// Shutter that counts how often it was played
#[derive(Debug, Default)]
pub struct RecordingShutter {
    plays: AtomicUsize,
}

impl RecordingShutter {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl ShutterSound for RecordingShutter {
    fn play(&self) {
        self.plays.fetch_add(1, Ordering::SeqCst);
    }
}
