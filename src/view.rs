//! Render model handed to the embedding UI
//!
//! The controller does not draw anything. `CameraView` describes what the
//! preview should look like for a given props/state pair.

use crate::controller::CameraSnapshot;
use crate::props::CameraProps;
use crate::types::EncodedImage;
use serde::Serialize;

pub const CONTAINER_CLASS: &str = "crabshot";
pub const FULLSCREEN_CLASS: &str = "crabshot-fullscreen";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraView {
    pub class_name: String,
    pub show_video: bool,
    /// Preview is flipped horizontally
    pub mirror_video: bool,
    pub show_image: bool,
    pub image: Option<EncodedImage>,
    /// White flash overlay, shown while the captured image is on screen
    pub show_white_flash: bool,
    /// Shutter button is drawn pressed
    pub shutter_pressed: bool,
    pub error_banner: Option<String>,
}

impl CameraView {
    pub fn render(props: &CameraProps, snapshot: &CameraSnapshot) -> Self {
        let show_video = snapshot.view.is_video_visible;
        let show_image = snapshot.view.is_image_visible();

        let class_name = if props.is_fullscreen {
            format!("{} {}", CONTAINER_CLASS, FULLSCREEN_CLASS)
        } else {
            CONTAINER_CLASS.to_string()
        };

        let error_banner = (props.is_display_start_camera_error
            && !snapshot.start_error_message.is_empty())
        .then(|| snapshot.start_error_message.clone());

        Self {
            class_name,
            show_video,
            mirror_video: props.is_image_mirror,
            show_image,
            image: snapshot.view.last_captured_image.clone(),
            show_white_flash: show_image,
            shutter_pressed: show_image,
            error_banner,
        }
    }
}
