//! crabshot: camera preview and photo capture orchestration
//!
//! This crate drives a camera through a pluggable access provider: it starts
//! and stops the video stream, restarts it when the requested constraints
//! change, captures still frames and reports everything through callbacks.
//!
//! # Features
//! - Strictly sequenced start/stop/restart against the provider
//! - Single-shot capture display with cancel-then-replace reversion
//! - Error taxonomy mapped from provider-reported failures
//! - Render model for the embedding UI
//! - Synthetic provider for offline testing
//!
//! # Usage
//! ```rust,ignore
//! use crabshot::testing::SyntheticCamera;
//! use crabshot::{CameraCallbacks, CameraController, CameraProps, FacingMode};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let props = CameraProps::default().with_facing_mode(FacingMode::Environment);
//!     let callbacks = CameraCallbacks::new().on_take_photo(|image| {
//!         println!("captured {} bytes", image.size_bytes());
//!     });
//!
//!     let camera = Arc::new(SyntheticCamera::new());
//!     let mut camera = CameraController::mount(camera, props, callbacks)?;
//!     camera.settled().await?;
//!     camera.take_photo()?;
//!     camera.teardown().await;
//!     Ok(())
//! }
//! ```
pub mod controller;
pub mod errors;
pub mod events;
pub mod props;
pub mod provider;
pub mod timer;
pub mod types;
pub mod view;

// Testing utilities - synthetic provider for offline testing
pub mod testing;

// Re-exports for convenience
pub use controller::{CameraController, CameraSnapshot};
pub use errors::{CameraError, CameraErrorKind, ControllerError};
pub use events::CameraCallbacks;
pub use props::CameraProps;
pub use provider::{CameraAccessProvider, LoggedShutter, ShutterSound};
pub use types::{
    CaptureConfig, EncodedImage, FacingMode, ImageType, LifecycleState, MediaStream, Resolution,
    ResolutionRequest, StartConfig, ViewState,
};
pub use view::CameraView;

/// Initialize logging for the camera controller
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "crabshot=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
