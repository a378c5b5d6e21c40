use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which physical camera to prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user
    #[default]
    User,
    /// Rear camera, facing away from the user
    Environment,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(FacingMode::User),
            "environment" => Ok(FacingMode::Environment),
            other => Err(format!("unknown facing mode: {}", other)),
        }
    }
}

/// Requested width/height hint, not a hard guarantee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Encodings a capture can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    #[default]
    Png,
    Jpg,
}

impl ImageType {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpg => "jpg",
        }
    }
}

impl FromStr for ImageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageType::Png),
            "jpg" | "jpeg" => Ok(ImageType::Jpg),
            other => Err(format!("unsupported image type: {}", other)),
        }
    }
}

/// Either a resolution hint or "use the device maximum"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionRequest {
    Ideal(Option<Resolution>),
    Maximum,
}

/// Determines which provider start operation is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartConfig {
    pub facing_mode: Option<FacingMode>,
    pub resolution: ResolutionRequest,
}

/// Passed opaquely to the provider's capture operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CaptureConfig {
    pub size_factor: f64,
    pub image_type: ImageType,
    /// 0.0..=1.0, only meaningful for lossy encodings
    pub image_compression: f64,
    pub is_image_mirror: bool,
}

/// Opaque handle to a started video stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaStream {
    pub id: Uuid,
    pub facing_mode: Option<FacingMode>,
    pub width: u32,
    pub height: u32,
}

impl MediaStream {
    pub fn new(facing_mode: Option<FacingMode>, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            facing_mode,
            width,
            height,
        }
    }
}

/// Encoded still frame produced by a capture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedImage {
    pub image_type: ImageType,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing)]
    pub data: Bytes,
    pub captured_at: DateTime<Utc>,
}

impl EncodedImage {
    pub fn new(image_type: ImageType, width: u32, height: u32, data: impl Into<Bytes>) -> Self {
        Self {
            image_type,
            width,
            height,
            data: data.into(),
            captured_at: Utc::now(),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.image_type.mime_type()
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Camera lifecycle as seen by the embedding UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LifecycleState {
    #[default]
    Stopped,
    Starting,
    Started,
    Errored,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Stopped => write!(f, "stopped"),
            LifecycleState::Starting => write!(f, "starting"),
            LifecycleState::Started => write!(f, "started"),
            LifecycleState::Errored => write!(f, "errored"),
        }
    }
}

/// Which of the video feed or the captured image is on screen.
///
/// Exactly one is visible at a time; the captured image is visible whenever
/// the video is not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub is_video_visible: bool,
    pub last_captured_image: Option<EncodedImage>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            is_video_visible: true,
            last_captured_image: None,
        }
    }
}

impl ViewState {
    pub fn is_image_visible(&self) -> bool {
        !self.is_video_visible
    }

    pub(crate) fn show_captured(&mut self, image: EncodedImage) {
        self.last_captured_image = Some(image);
        self.is_video_visible = false;
    }

    pub(crate) fn show_video(&mut self) {
        self.is_video_visible = true;
    }
}
