#[cfg(test)]
mod controller_tests {
    use crabshot::testing::{
        EventRecorder, ProviderCall, RecordedEvent, RecordingShutter, SyntheticCamera,
    };
    use crabshot::{
        CameraController, CameraError, CameraErrorKind, CameraProps, ControllerError, FacingMode,
        ImageType, LifecycleState, Resolution,
    };
    use std::sync::Arc;
    use std::time::Duration;

    fn mount(
        props: CameraProps,
    ) -> (CameraController<SyntheticCamera>, Arc<SyntheticCamera>, EventRecorder) {
        mount_with(Arc::new(SyntheticCamera::new()), props)
    }

    fn mount_with(
        camera: Arc<SyntheticCamera>,
        props: CameraProps,
    ) -> (CameraController<SyntheticCamera>, Arc<SyntheticCamera>, EventRecorder) {
        let recorder = EventRecorder::new();
        let controller = CameraController::mount(camera.clone(), props, recorder.callbacks())
            .expect("mount should succeed inside a runtime");
        (controller, camera, recorder)
    }

    fn small_props() -> CameraProps {
        let mut props = CameraProps::default();
        props.size_factor = 0.1;
        props
    }

    fn is_start(event: &RecordedEvent) -> bool {
        matches!(event, RecordedEvent::CameraStart(_))
    }

    fn is_error(event: &RecordedEvent) -> bool {
        matches!(event, RecordedEvent::CameraError(_))
    }

    #[tokio::test(start_paused = true)]
    async fn test_environment_resolution_scenario() {
        let props = CameraProps::default()
            .with_facing_mode(FacingMode::Environment)
            .with_resolution(640, 480);
        let (mut controller, camera, recorder) = mount(props);
        controller.settled().await.unwrap();

        assert_eq!(
            camera.lifecycle_calls(),
            vec![ProviderCall::StartWithResolution {
                facing_mode: Some(FacingMode::Environment),
                resolution: Some(Resolution::new(640, 480)),
            }]
        );

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.lifecycle, LifecycleState::Started);
        assert!(snapshot.is_camera_started);
        assert!(snapshot.start_error_message.is_empty());
        assert_eq!(recorder.count(is_start), 1);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_starting_state_while_provider_pending() {
        let camera = Arc::new(SyntheticCamera::new());
        camera.set_start_delay(Duration::from_millis(200));
        let (mut controller, _camera, recorder) = mount_with(camera, CameraProps::default());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(controller.snapshot().lifecycle, LifecycleState::Starting);
        assert_eq!(recorder.count(is_start), 0);

        controller.settled().await.unwrap();
        assert_eq!(controller.snapshot().lifecycle, LifecycleState::Started);
        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_failure_is_captured_into_state() {
        let camera = Arc::new(SyntheticCamera::new());
        let denied = CameraError::permission_denied("Permission denied");
        camera.fail_next_start(denied.clone());

        let (mut controller, _camera, recorder) = mount_with(camera, CameraProps::default());
        controller.settled().await.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.lifecycle, LifecycleState::Errored);
        assert!(!snapshot.is_camera_started);
        assert_eq!(snapshot.start_error_message, "NotAllowedError Permission denied");
        assert_eq!(recorder.events(), vec![RecordedEvent::CameraError(denied)]);
        assert_eq!(
            controller.view().error_banner.as_deref(),
            Some("NotAllowedError Permission denied")
        );

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_recovers_after_start_failure() {
        let camera = Arc::new(SyntheticCamera::new());
        camera.fail_next_start(CameraError::already_in_use("Could not start video source"));
        let (mut controller, _camera, recorder) = mount_with(camera, CameraProps::default());
        controller.settled().await.unwrap();
        assert_eq!(controller.snapshot().lifecycle, LifecycleState::Errored);

        controller.restart().unwrap();
        controller.settled().await.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.lifecycle, LifecycleState::Started);
        assert!(snapshot.start_error_message.is_empty());
        assert!(controller.view().error_banner.is_none());
        assert_eq!(recorder.count(is_start), 1);
        assert_eq!(recorder.count(is_error), 1);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfiguration_issues_stop_then_start() {
        let camera = Arc::new(SyntheticCamera::new());
        camera.set_start_delay(Duration::from_millis(40));
        camera.set_stop_delay(Duration::from_millis(25));
        let (mut controller, camera, _recorder) = mount_with(camera, CameraProps::default());

        let changes = [
            CameraProps::default().with_facing_mode(FacingMode::Environment),
            CameraProps::default().with_facing_mode(FacingMode::User),
            CameraProps::default()
                .with_facing_mode(FacingMode::User)
                .with_resolution(1280, 720),
        ];
        for props in changes {
            assert!(controller.update_props(props).unwrap());
        }
        controller.settled().await.unwrap();

        let calls = camera.lifecycle_calls();
        assert_eq!(calls.len(), 7);
        assert!(calls[0].is_start());
        for pair in calls[1..].chunks(2) {
            assert_eq!(pair[0], ProviderCall::Stop);
            assert!(pair[1].is_start());
        }
        assert_eq!(
            calls[6],
            ProviderCall::StartWithResolution {
                facing_mode: Some(FacingMode::User),
                resolution: Some(Resolution::new(1280, 720)),
            }
        );
        assert_eq!(controller.snapshot().lifecycle, LifecycleState::Started);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_resolution_toggle_restarts_once() {
        let (mut controller, camera, _recorder) = mount(CameraProps::default());
        controller.settled().await.unwrap();

        let restarted = controller
            .update_props(CameraProps::default().with_max_resolution(true))
            .unwrap();
        assert!(restarted);
        controller.settled().await.unwrap();

        assert_eq!(
            camera.lifecycle_calls(),
            vec![
                ProviderCall::StartWithResolution {
                    facing_mode: None,
                    resolution: None,
                },
                ProviderCall::Stop,
                ProviderCall::StartWithMaxResolution { facing_mode: None },
            ]
        );
        let stream = camera.active_stream().unwrap();
        assert_eq!((stream.width, stream.height), (1920, 1080));

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_constraint_change_does_not_restart() {
        let (mut controller, camera, _recorder) = mount(small_props());
        controller.settled().await.unwrap();

        let mut props = small_props();
        props.image_type = ImageType::Jpg;
        props.is_silent_mode = true;
        assert!(!controller.update_props(props).unwrap());
        controller.settled().await.unwrap();

        assert_eq!(camera.lifecycle_calls().len(), 1);
        let image = controller.take_photo().unwrap();
        assert_eq!(image.image_type, ImageType::Jpg);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_proceeds_when_stop_fails() {
        let (mut controller, camera, recorder) = mount(CameraProps::default());
        controller.settled().await.unwrap();

        let stop_error = CameraError::unknown("track already ended");
        camera.fail_next_stop(stop_error.clone());
        controller
            .update_props(CameraProps::default().with_facing_mode(FacingMode::Environment))
            .unwrap();
        controller.settled().await.unwrap();

        assert_eq!(camera.lifecycle_calls().len(), 3);
        assert_eq!(recorder.count(is_start), 2);
        assert_eq!(recorder.count(is_error), 1);
        assert!(recorder.events().contains(&RecordedEvent::CameraError(stop_error)));
        assert!(!recorder.events().contains(&RecordedEvent::CameraStop));
        assert_eq!(controller.snapshot().lifecycle, LifecycleState::Started);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_stop_and_start() {
        let (mut controller, camera, recorder) = mount(CameraProps::default());
        controller.settled().await.unwrap();

        controller.stop().unwrap();
        controller.settled().await.unwrap();
        assert_eq!(controller.snapshot().lifecycle, LifecycleState::Stopped);
        assert!(!camera.is_streaming());
        assert_eq!(recorder.count(|e| *e == RecordedEvent::CameraStop), 1);

        controller.start().unwrap();
        controller.settled().await.unwrap();
        assert_eq!(controller.snapshot().lifecycle, LifecycleState::Started);
        assert!(camera.is_streaming());

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_started_is_ignored() {
        let (mut controller, camera, recorder) = mount(CameraProps::default());
        controller.settled().await.unwrap();
        let stream = camera.active_stream();

        controller.start().unwrap();
        controller.start().unwrap();
        controller.settled().await.unwrap();

        assert_eq!(camera.lifecycle_calls().len(), 1);
        assert_eq!(camera.active_stream(), stream);
        assert_eq!(recorder.count(is_start), 1);
        assert_eq!(controller.snapshot().lifecycle, LifecycleState::Started);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_hides_video_until_reversion() {
        let (mut controller, _camera, recorder) = mount(small_props());
        controller.settled().await.unwrap();

        let image = controller.take_photo().unwrap();
        assert_eq!(recorder.events().last(), Some(&RecordedEvent::TakePhoto(image.clone())));

        let snapshot = controller.snapshot();
        assert!(!snapshot.view.is_video_visible);
        assert_eq!(snapshot.view.last_captured_image.as_ref(), Some(&image));
        assert!(controller.view().show_white_flash);

        tokio::time::sleep(Duration::from_millis(899)).await;
        assert!(!controller.snapshot().view.is_video_visible);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(controller.snapshot().view.is_video_visible);
        assert_eq!(
            recorder.events().last(),
            Some(&RecordedEvent::TakePhotoAnimationDone(image))
        );

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_captures_revert_once_with_latest_image() {
        let (mut controller, _camera, recorder) = mount(small_props());
        controller.settled().await.unwrap();

        let mut last = None;
        for _ in 0..3 {
            last = Some(controller.take_photo().unwrap());
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;

        let done: Vec<_> = recorder
            .events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::TakePhotoAnimationDone(image) => Some(image),
                _ => None,
            })
            .collect();
        assert_eq!(done, vec![last.unwrap()]);
        assert_eq!(recorder.count(|e| matches!(e, RecordedEvent::TakePhoto(_))), 3);
        assert!(controller.snapshot().view.is_video_visible);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutter_sound_respects_silent_mode() {
        let camera = Arc::new(SyntheticCamera::new());
        let shutter = Arc::new(RecordingShutter::default());
        let recorder = EventRecorder::new();
        let mut controller = CameraController::mount_with_shutter(
            camera,
            small_props().with_silent_mode(true),
            recorder.callbacks(),
            shutter.clone(),
        )
        .unwrap();
        controller.settled().await.unwrap();

        controller.take_photo().unwrap();
        assert_eq!(shutter.plays(), 0);
        assert_eq!(recorder.count(|e| matches!(e, RecordedEvent::TakePhoto(_))), 1);

        controller.update_props(small_props()).unwrap();
        controller.take_photo().unwrap();
        assert_eq!(shutter.plays(), 1);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutter_plays_before_photo_callback() {
        let recorder = EventRecorder::new();
        let mut controller = CameraController::mount_with_shutter(
            Arc::new(SyntheticCamera::new()),
            small_props(),
            recorder.callbacks(),
            recorder.shutter(),
        )
        .unwrap();
        controller.settled().await.unwrap();
        recorder.clear();

        let image = controller.take_photo().unwrap();
        assert_eq!(
            recorder.events(),
            vec![RecordedEvent::ShutterPlayed, RecordedEvent::TakePhoto(image.clone())]
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(
            recorder.events().last(),
            Some(&RecordedEvent::TakePhotoAnimationDone(image))
        );

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_capture_fails_without_panicking() {
        let mut props = CameraProps::default().with_max_resolution(true);
        props.size_factor = 1e9;
        let (mut controller, _camera, recorder) = mount(props);
        controller.settled().await.unwrap();

        let result = controller.take_photo();
        assert!(matches!(result, Err(ControllerError::Capture(ref e))
            if e.kind() == CameraErrorKind::ConstraintUnsatisfiable));
        assert_eq!(recorder.count(is_error), 1);
        assert!(controller.snapshot().view.is_video_visible);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_without_stream_reports_error() {
        let camera = Arc::new(SyntheticCamera::new());
        camera.fail_next_start(CameraError::device_unavailable("Requested device not found"));
        let (mut controller, _camera, recorder) = mount_with(camera, small_props());
        controller.settled().await.unwrap();

        let result = controller.take_photo();
        assert!(matches!(result, Err(ControllerError::Capture(_))));
        assert_eq!(recorder.count(is_error), 2);
        assert!(controller.snapshot().view.is_video_visible);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_while_stop_pending_has_no_side_effects() {
        let camera = Arc::new(SyntheticCamera::new());
        camera.set_stop_delay(Duration::from_millis(100));
        let (mut controller, camera, recorder) = mount_with(camera, CameraProps::default());
        controller.settled().await.unwrap();

        controller
            .update_props(CameraProps::default().with_facing_mode(FacingMode::Environment))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(camera.lifecycle_calls().last(), Some(&ProviderCall::Stop));

        controller.teardown().await;

        assert_eq!(
            camera.lifecycle_calls(),
            vec![
                ProviderCall::StartWithResolution {
                    facing_mode: None,
                    resolution: None,
                },
                ProviderCall::Stop,
                ProviderCall::Stop,
            ]
        );
        assert_eq!(recorder.events().len(), 1);
        assert!(is_start(&recorder.events()[0]));
        assert_eq!(controller.snapshot().lifecycle, LifecycleState::Started);
        assert!(!camera.is_streaming());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_reversion_timer() {
        let (mut controller, _camera, recorder) = mount(small_props());
        controller.settled().await.unwrap();
        controller.take_photo().unwrap();

        controller.teardown().await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(
            recorder.count(|e| matches!(e, RecordedEvent::TakePhotoAnimationDone(_))),
            0
        );
        assert!(!controller.snapshot().view.is_video_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_swallows_stop_failure() {
        let (mut controller, camera, recorder) = mount(CameraProps::default());
        controller.settled().await.unwrap();
        camera.fail_next_stop(CameraError::unknown("stop failed"));

        controller.teardown().await;

        assert_eq!(recorder.count(is_error), 0);
        assert_eq!(recorder.count(|e| *e == RecordedEvent::CameraStop), 0);
        assert_eq!(camera.lifecycle_calls().last(), Some(&ProviderCall::Stop));
    }

    #[tokio::test(start_paused = true)]
    async fn test_operations_after_teardown_fail() {
        let (mut controller, _camera, _recorder) = mount(small_props());
        controller.settled().await.unwrap();
        controller.teardown().await;
        controller.teardown().await;

        assert!(!controller.is_mounted());
        assert!(matches!(controller.take_photo(), Err(ControllerError::TornDown)));
        assert!(matches!(controller.restart(), Err(ControllerError::TornDown)));
        assert!(matches!(
            controller.update_props(CameraProps::default()),
            Err(ControllerError::TornDown)
        ));
        assert!(matches!(controller.settled().await, Err(ControllerError::TornDown)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_camera_silently() {
        let (controller, camera, recorder) = mount(CameraProps::default());
        controller.settled().await.unwrap();
        drop(controller);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!camera.is_streaming());
        assert_eq!(recorder.count(|e| *e == RecordedEvent::CameraStop), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_instances_are_independent() {
        let (mut front, _front_camera, _front_events) = mount(small_props());
        let (mut rear, rear_camera, rear_events) =
            mount(small_props().with_facing_mode(FacingMode::Environment));
        futures::future::try_join(front.settled(), rear.settled())
            .await
            .unwrap();

        front.take_photo().unwrap();
        assert!(!front.snapshot().view.is_video_visible);
        assert!(rear.snapshot().view.is_video_visible);
        assert!(rear_events.events().iter().all(is_start));

        front.teardown().await;
        assert!(rear_camera.is_streaming());
        assert_eq!(rear.snapshot().lifecycle, LifecycleState::Started);
        rear.teardown().await;
    }

    #[test]
    fn test_mount_requires_runtime() {
        let result = CameraController::mount(
            Arc::new(SyntheticCamera::new()),
            CameraProps::default(),
            EventRecorder::new().callbacks(),
        );
        assert!(matches!(result, Err(ControllerError::NoRuntime)));
    }

    #[test]
    fn test_mount_rejects_invalid_props() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let mut props = CameraProps::default();
            props.image_compression = 2.0;
            let result = CameraController::mount(
                Arc::new(SyntheticCamera::new()),
                props,
                EventRecorder::new().callbacks(),
            );
            assert!(matches!(result, Err(ControllerError::InvalidProps(_))));
        });
    }
}
