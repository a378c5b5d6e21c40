//! Camera controller: drives the camera lifecycle and the photo capture
//!
//! One controller owns one camera for its whole lifetime. Lifecycle commands
//! (start, stop, restart) are queued to a driver task that runs them strictly
//! in order, so a new start is never issued before the preceding stop has
//! settled. Captures run on the caller's thread and arm the reversion timer
//! that brings the live video back.
//!
//! Once torn down the controller no longer mutates its state or fires
//! callbacks; operations already awaiting the provider are still drained.

use crate::errors::{CameraError, ControllerError};
use crate::events::CameraCallbacks;
use crate::props::CameraProps;
use crate::provider::{CameraAccessProvider, LoggedShutter, ShutterSound};
use crate::timer::{ReversionTimer, TimerTicket, REVERSION_DELAY};
use crate::types::{EncodedImage, LifecycleState, ResolutionRequest, StartConfig, ViewState};
use crate::view::CameraView;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Point-in-time copy of the UI-visible controller state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraSnapshot {
    pub lifecycle: LifecycleState,
    pub view: ViewState,
    pub is_camera_started: bool,
    /// `"<name> <message>"` of the last failed start, empty after a successful one
    pub start_error_message: String,
}

enum Command {
    Start(StartConfig),
    Stop,
    Restart(StartConfig),
    Settle(oneshot::Sender<()>),
}

struct ControllerState {
    lifecycle: LifecycleState,
    view: ViewState,
    start_error_message: String,
    props: CameraProps,
    reversion: ReversionTimer,
    destroyed: bool,
}

impl ControllerState {
    fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            lifecycle: self.lifecycle,
            view: self.view.clone(),
            is_camera_started: self.lifecycle == LifecycleState::Started,
            start_error_message: self.start_error_message.clone(),
        }
    }
}

struct Shared {
    state: Mutex<ControllerState>,
    callbacks: CameraCallbacks,
    shutter: Arc<dyn ShutterSound>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    fn is_started(&self) -> bool {
        self.lock().lifecycle == LifecycleState::Started
    }

    /// Apply a state change, then its notification. Does nothing once destroyed.
    fn commit(
        &self,
        mutate: impl FnOnce(&mut ControllerState),
        notify: impl FnOnce(&CameraCallbacks),
    ) -> bool {
        {
            let mut state = self.lock();
            if state.destroyed {
                return false;
            }
            mutate(&mut state);
        }
        notify(&self.callbacks);
        true
    }

    fn destroy(&self) {
        let mut state = self.lock();
        state.destroyed = true;
        state.reversion.cancel();
    }

    fn finish_reversion(&self, ticket: TimerTicket) {
        let image = {
            let mut state = self.lock();
            if state.destroyed || !state.reversion.claim(ticket) {
                return;
            }
            state.view.show_video();
            state.view.last_captured_image.clone()
        };

        log::debug!("Capture display elapsed, showing live video");
        if let Some(image) = image {
            self.callbacks.photo_animation_done(&image);
        }
    }
}

/// Drives one camera through a `CameraAccessProvider`
pub struct CameraController<P: CameraAccessProvider> {
    provider: Arc<P>,
    shared: Arc<Shared>,
    commands: Option<mpsc::UnboundedSender<Command>>,
    driver: Option<JoinHandle<()>>,
}

impl<P: CameraAccessProvider> CameraController<P> {
    /// Create the controller and start the camera with `props`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(
        provider: Arc<P>,
        props: CameraProps,
        callbacks: CameraCallbacks,
    ) -> Result<Self, ControllerError> {
        Self::mount_with_shutter(provider, props, callbacks, Arc::new(LoggedShutter))
    }

    pub fn mount_with_shutter(
        provider: Arc<P>,
        props: CameraProps,
        callbacks: CameraCallbacks,
        shutter: Arc<dyn ShutterSound>,
    ) -> Result<Self, ControllerError> {
        props.validate()?;
        let runtime = Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;

        let initial = props.start_config();
        let shared = Arc::new(Shared {
            state: Mutex::new(ControllerState {
                lifecycle: LifecycleState::Stopped,
                view: ViewState::default(),
                start_error_message: String::new(),
                props,
                reversion: ReversionTimer::new(runtime.clone()),
                destroyed: false,
            }),
            callbacks,
            shutter,
        });

        let (tx, rx) = mpsc::unbounded_channel();
        let driver = runtime.spawn(drive(provider.clone(), shared.clone(), rx));

        let controller = Self {
            provider,
            shared,
            commands: Some(tx),
            driver: Some(driver),
        };

        log::info!("Mounting camera controller: {:?}", initial);
        controller.send(Command::Start(initial))?;
        Ok(controller)
    }

    /// Queue a start with the current props. Ignored if the camera is
    /// already started when the command runs.
    pub fn start(&self) -> Result<(), ControllerError> {
        let config = self.shared.lock().props.start_config();
        self.send(Command::Start(config))
    }

    pub fn stop(&self) -> Result<(), ControllerError> {
        self.send(Command::Stop)
    }

    /// Queue a stop followed by a start with the current props.
    ///
    /// The start is issued even when the stop fails.
    pub fn restart(&self) -> Result<(), ControllerError> {
        let config = self.shared.lock().props.start_config();
        self.send(Command::Restart(config))
    }

    /// Replace the props. Returns true when the change queued a restart.
    pub fn update_props(&self, props: CameraProps) -> Result<bool, ControllerError> {
        props.validate()?;

        let restart = {
            let mut state = self.shared.lock();
            if state.destroyed {
                return Err(ControllerError::TornDown);
            }
            let needs_restart = CameraProps::requires_restart(&state.props, &props);
            state.props = props;
            needs_restart.then(|| state.props.start_config())
        };

        match restart {
            Some(config) => {
                log::info!("Camera constraints changed, restarting: {:?}", config);
                self.send(Command::Restart(config))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Capture a still frame and show it until the reversion timer fires.
    ///
    /// A capture before the previous one reverted replaces its timer, so only
    /// the most recent image is reported as done.
    pub fn take_photo(&self) -> Result<EncodedImage, ControllerError> {
        let (config, is_silent) = {
            let state = self.shared.lock();
            if state.destroyed {
                return Err(ControllerError::TornDown);
            }
            (state.props.capture_config(), state.props.is_silent_mode)
        };

        let image = match self.provider.capture(&config) {
            Ok(image) => image,
            Err(error) => {
                log::warn!("Capture failed: {}", error);
                self.shared
                    .commit(|_| {}, |callbacks| callbacks.camera_error(&error));
                return Err(ControllerError::Capture(error));
            }
        };
        log::debug!(
            "Captured {}x{} {} ({} bytes)",
            image.width,
            image.height,
            image.mime_type(),
            image.size_bytes()
        );

        if !is_silent {
            self.shared.shutter.play();
        }
        self.shared.callbacks.photo_taken(&image);

        let weak = Arc::downgrade(&self.shared);
        self.shared.commit(
            |state| {
                state.view.show_captured(image.clone());
                state.reversion.arm(REVERSION_DELAY, move |ticket| {
                    if let Some(shared) = weak.upgrade() {
                        shared.finish_reversion(ticket);
                    }
                });
            },
            |_| {},
        );

        Ok(image)
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn props(&self) -> CameraProps {
        self.shared.lock().props.clone()
    }

    /// Render model for the current props and state
    pub fn view(&self) -> CameraView {
        let state = self.shared.lock();
        CameraView::render(&state.props, &state.snapshot())
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn is_mounted(&self) -> bool {
        self.driver.is_some()
    }

    /// Wait until every lifecycle command queued so far has settled
    pub async fn settled(&self) -> Result<(), ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Settle(tx))?;
        rx.await.map_err(|_| ControllerError::TornDown)
    }

    /// Destroy the controller.
    ///
    /// Cancels the reversion timer, waits for in-flight provider calls, skips
    /// commands still queued and releases the camera. Stop failures here are
    /// logged and swallowed. The final snapshot stays readable afterwards.
    pub async fn teardown(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };

        self.shared.destroy();
        self.commands.take();

        if let Err(e) = driver.await {
            log::error!("Camera driver task failed: {}", e);
        }
    }

    fn send(&self, command: Command) -> Result<(), ControllerError> {
        self.commands
            .as_ref()
            .ok_or(ControllerError::TornDown)?
            .send(command)
            .map_err(|_| ControllerError::TornDown)
    }
}

impl<P: CameraAccessProvider> Drop for CameraController<P> {
    fn drop(&mut self) {
        if self.driver.take().is_some() {
            log::debug!("Controller dropped without teardown, releasing camera in background");
            self.shared.destroy();
            self.commands.take();
        }
    }
}

async fn drive<P: CameraAccessProvider>(
    provider: Arc<P>,
    shared: Arc<Shared>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = commands.recv().await {
        let destroyed = shared.is_destroyed();
        match command {
            Command::Settle(ack) => {
                let _ = ack.send(());
            }
            _ if destroyed => {
                log::debug!("Skipping camera command queued before teardown");
            }
            Command::Start(config) => {
                let already_started = shared.is_started();
                if already_started {
                    log::debug!("Camera already started, ignoring start");
                } else {
                    start_camera(provider.as_ref(), &shared, config).await;
                }
            }
            Command::Stop => {
                if let Err(error) = stop_camera(provider.as_ref(), &shared, false).await {
                    log::warn!("Camera stop failed: {}", error);
                }
            }
            Command::Restart(config) => restart_camera(provider.as_ref(), &shared, config).await,
        }
    }

    log::info!("Releasing camera after teardown");
    if let Err(error) = stop_camera(provider.as_ref(), &shared, true).await {
        log::warn!("Camera stop during teardown failed: {}", error);
    }
}

async fn start_camera<P: CameraAccessProvider>(provider: &P, shared: &Shared, config: StartConfig) {
    if !shared.commit(|state| state.lifecycle = LifecycleState::Starting, |_| {}) {
        return;
    }

    let result = match config.resolution {
        ResolutionRequest::Maximum => provider.start_with_max_resolution(config.facing_mode).await,
        ResolutionRequest::Ideal(resolution) => {
            provider
                .start_with_resolution(config.facing_mode, resolution)
                .await
        }
    };

    match result {
        Ok(stream) => {
            log::info!(
                "Camera started: {}x{} facing {:?}",
                stream.width,
                stream.height,
                stream.facing_mode
            );
            shared.commit(
                |state| {
                    state.lifecycle = LifecycleState::Started;
                    state.start_error_message.clear();
                },
                |callbacks| callbacks.camera_started(&stream),
            );
        }
        Err(error) => {
            log::warn!("Camera start failed ({}): {}", error.kind(), error);
            let message = error.display_message();
            shared.commit(
                |state| {
                    state.lifecycle = LifecycleState::Errored;
                    state.start_error_message = message;
                },
                |callbacks| callbacks.camera_error(&error),
            );
        }
    }
}

async fn stop_camera<P: CameraAccessProvider>(
    provider: &P,
    shared: &Shared,
    is_teardown: bool,
) -> Result<(), CameraError> {
    match provider.stop().await {
        Ok(()) => {
            if !is_teardown {
                log::info!("Camera stopped");
                shared.commit(
                    |state| state.lifecycle = LifecycleState::Stopped,
                    |callbacks| callbacks.camera_stopped(),
                );
            }
            Ok(())
        }
        Err(error) => {
            if !is_teardown {
                shared.commit(|_| {}, |callbacks| callbacks.camera_error(&error));
            }
            Err(error)
        }
    }
}

async fn restart_camera<P: CameraAccessProvider>(
    provider: &P,
    shared: &Shared,
    config: StartConfig,
) {
    if let Err(error) = stop_camera(provider, shared, false).await {
        log::warn!("Camera stop before restart failed, starting anyway: {}", error);
    }
    start_camera(provider, shared, config).await;
}
