//! Camera props: the options an embedding application configures
//!
//! Props can be built in code or loaded from a TOML file. Missing keys fall
//! back to the defaults below.

use crate::errors::ControllerError;
use crate::types::{
    CaptureConfig, FacingMode, ImageType, Resolution, ResolutionRequest, StartConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default lossy compression quality
pub const DEFAULT_IMAGE_COMPRESSION: f64 = 0.92;

/// Default capture scale relative to the stream resolution
pub const DEFAULT_SIZE_FACTOR: f64 = 1.0;

/// Recognized camera options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraProps {
    /// Preferred camera; unset lets the provider choose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal_facing_mode: Option<FacingMode>,
    /// Request the highest resolution the device supports, ignoring `ideal_resolution`
    pub is_max_resolution: bool,
    pub image_type: ImageType,
    /// Compression quality in 0.0..=1.0
    pub image_compression: f64,
    /// Mirror both the live preview and the captured image
    pub is_image_mirror: bool,
    /// Skip the shutter click sound
    pub is_silent_mode: bool,
    /// Show the start error banner inline
    pub is_display_start_camera_error: bool,
    pub size_factor: f64,
    pub is_fullscreen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal_resolution: Option<Resolution>,
}

impl Default for CameraProps {
    fn default() -> Self {
        Self {
            ideal_facing_mode: None,
            is_max_resolution: false,
            image_type: ImageType::Png,
            image_compression: DEFAULT_IMAGE_COMPRESSION,
            is_image_mirror: true,
            is_silent_mode: false,
            is_display_start_camera_error: true,
            size_factor: DEFAULT_SIZE_FACTOR,
            is_fullscreen: false,
            ideal_resolution: None,
        }
    }
}

impl CameraProps {
    pub fn with_facing_mode(mut self, facing_mode: FacingMode) -> Self {
        self.ideal_facing_mode = Some(facing_mode);
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.ideal_resolution = Some(Resolution::new(width, height));
        self
    }

    pub fn with_max_resolution(mut self, is_max_resolution: bool) -> Self {
        self.is_max_resolution = is_max_resolution;
        self
    }

    pub fn with_image_type(mut self, image_type: ImageType) -> Self {
        self.image_type = image_type;
        self
    }

    pub fn with_silent_mode(mut self, is_silent_mode: bool) -> Self {
        self.is_silent_mode = is_silent_mode;
        self
    }

    /// Which start variant these props ask for
    pub fn start_config(&self) -> StartConfig {
        let resolution = if self.is_max_resolution {
            ResolutionRequest::Maximum
        } else {
            ResolutionRequest::Ideal(self.ideal_resolution)
        };

        StartConfig {
            facing_mode: self.ideal_facing_mode,
            resolution,
        }
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            size_factor: self.size_factor,
            image_type: self.image_type,
            image_compression: self.image_compression,
            is_image_mirror: self.is_image_mirror,
        }
    }

    /// True when moving from `old` to `new` changes the facing mode, the
    /// resolution or the max-resolution flag.
    pub fn requires_restart(old: &CameraProps, new: &CameraProps) -> bool {
        old.ideal_facing_mode != new.ideal_facing_mode
            || old.ideal_resolution != new.ideal_resolution
            || old.is_max_resolution != new.is_max_resolution
    }

    /// Validate props values
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !(0.0..=1.0).contains(&self.image_compression) {
            return Err(ControllerError::InvalidProps(
                "Image compression must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(self.size_factor.is_finite() && self.size_factor > 0.0) {
            return Err(ControllerError::InvalidProps(
                "Size factor must be a positive number".to_string(),
            ));
        }
        if let Some(resolution) = self.ideal_resolution {
            if !resolution.is_valid() {
                return Err(ControllerError::InvalidProps(format!(
                    "Invalid ideal resolution {}",
                    resolution
                )));
            }
        }
        Ok(())
    }

    /// Load props from a TOML file, falling back to defaults when it is missing
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ControllerError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Props file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let props: CameraProps = toml::from_str(&contents)?;
        props.validate()?;

        log::info!("Loaded camera props from {:?}", path);
        Ok(props)
    }

    /// Save props to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ControllerError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;

        log::info!("Saved camera props to {:?}", path);
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("crabshot.toml")
    }

    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load camera props, using defaults: {}", e);
            Self::default()
        })
    }
}
