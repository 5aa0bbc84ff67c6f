//! Tests for trigger validation, dispatch, reply handling and worker replacement

#[cfg(test)]
mod tests {
    use crate::support::{
        FAIL_WIDTH, OK_WIDTH, PANIC_WIDTH, failing_init_factory, flaky_init_factory,
        scripted_factory, selection,
    };
    use mosaicbuild::BuildError;
    use mosaicbuild::engine::EngineFactory;
    use mosaicbuild::orchestrator::{BuildPhase, BuildResult, FailureKind, Orchestrator};
    use mosaicbuild::selection::SelectionState;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn settle<F: EngineFactory>(orchestrator: &mut Orchestrator<F>) {
        while orchestrator.is_building() {
            assert!(
                orchestrator.wait_for_event(TIMEOUT),
                "worker did not answer in time"
            );
        }
    }

    // Tests a new orchestrator is idle with a live worker and no result
    // Verified by starting in the dispatched phase
    #[test]
    fn test_initial_state() {
        let orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        assert_eq!(orchestrator.phase(), BuildPhase::Idle);
        assert!(!orchestrator.is_building());
        assert!(orchestrator.result().is_none());
        assert!(orchestrator.worker_id().is_some());
        assert_eq!(orchestrator.replacements(), 0);
    }

    // Tests a missing master is refused without dispatch
    // Verified by checking the tile count first
    #[test]
    fn test_missing_master_refused() {
        let mut orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        let selection = SelectionState::new();

        assert_eq!(
            orchestrator.trigger_build(&selection),
            Err(BuildError::MissingMasterImage)
        );
        assert!(!orchestrator.is_building());
        assert_eq!(orchestrator.phase(), BuildPhase::Idle);
        assert!(orchestrator.in_flight().is_none());
        assert!(orchestrator.result().is_none());
    }

    // Tests a missing master is reported before a short tile pool
    // Verified by swapping the validation order
    #[test]
    fn test_master_checked_before_tiles() {
        let mut orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        let mut selection = SelectionState::new();
        selection.add_tile_images([("only.png", vec![0_u8])]);

        assert_eq!(
            orchestrator.trigger_build(&selection),
            Err(BuildError::MissingMasterImage)
        );
    }

    // Tests a short tile pool is refused with the counts and nothing is dispatched
    // Verified by comparing against the cell count instead of the requirement
    #[test]
    fn test_insufficient_tiles_refused() {
        let mut orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        let selection = selection(OK_WIDTH, 3);

        assert_eq!(
            orchestrator.trigger_build(&selection),
            Err(BuildError::InsufficientTiles {
                required: 4,
                have: 3
            })
        );
        assert!(!orchestrator.is_building());
        assert!(orchestrator.in_flight().is_none());
        assert_eq!(orchestrator.poll(), 0);
    }

    // Tests the building flag is set synchronously by the trigger
    // Verified by setting the flag when the reply arrives
    #[test]
    fn test_trigger_marks_building() {
        let mut orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        let id = orchestrator
            .trigger_build(&selection(OK_WIDTH, 4))
            .expect("build dispatched");

        assert!(orchestrator.is_building());
        assert_eq!(orchestrator.phase(), BuildPhase::Dispatched);
        assert_eq!(orchestrator.in_flight(), Some(id));
        assert_eq!(orchestrator.result(), Some(&BuildResult::Pending));
    }

    // Tests a successful reply settles the result and clears the flag
    // Verified by leaving the flag set after success
    #[test]
    fn test_success_settles() {
        let mut orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        orchestrator
            .trigger_build(&selection(OK_WIDTH, 4))
            .expect("build dispatched");
        settle(&mut orchestrator);

        assert_eq!(orchestrator.phase(), BuildPhase::Succeeded);
        assert!(orchestrator.in_flight().is_none());
        let mosaic = orchestrator
            .result()
            .and_then(BuildResult::mosaic)
            .expect("build succeeded");
        assert_eq!(mosaic.blueprint.cells.len(), 4);
        assert_eq!(mosaic.rendered_image, vec![1, 2, 3]);
        assert_eq!(mosaic.resolved_tiles.len(), 4);
    }

    // Tests a second trigger while building is refused without changing state
    // Verified by replacing the in-flight request
    #[test]
    fn test_trigger_while_building_is_noop() {
        let mut orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        let first = orchestrator
            .trigger_build(&selection(OK_WIDTH, 4))
            .expect("build dispatched");

        assert_eq!(
            orchestrator.trigger_build(&selection(OK_WIDTH, 4)),
            Err(BuildError::Busy)
        );
        assert_eq!(orchestrator.in_flight(), Some(first));
        assert_eq!(orchestrator.phase(), BuildPhase::Dispatched);
        assert!(orchestrator.is_building());

        settle(&mut orchestrator);
        assert_eq!(orchestrator.phase(), BuildPhase::Succeeded);
    }

    // Tests an engine error keeps the same worker for the next build
    // Verified by replacing the worker on every failure
    #[test]
    fn test_engine_error_keeps_worker() {
        let mut orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        let worker = orchestrator.worker_id();

        orchestrator
            .trigger_build(&selection(FAIL_WIDTH, 6))
            .expect("build dispatched");
        settle(&mut orchestrator);

        assert_eq!(orchestrator.phase(), BuildPhase::Failed);
        let failure = orchestrator
            .result()
            .and_then(BuildResult::failure)
            .expect("build failed");
        assert_eq!(failure.kind, FailureKind::Engine);
        assert!(failure.reason.contains("scripted failure"));
        assert_eq!(orchestrator.worker_id(), worker);

        orchestrator
            .trigger_build(&selection(OK_WIDTH, 4))
            .expect("build dispatched");
        settle(&mut orchestrator);
        assert_eq!(orchestrator.phase(), BuildPhase::Succeeded);
        assert_eq!(orchestrator.worker_id(), worker);
        assert_eq!(orchestrator.replacements(), 0);
    }

    // Tests a crash replaces the worker and returns to idle
    // Verified by reusing the crashed worker
    #[test]
    fn test_crash_replaces_worker() {
        let mut orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        let crashed = orchestrator.worker_id();

        orchestrator
            .trigger_build(&selection(PANIC_WIDTH, 8))
            .expect("build dispatched");
        settle(&mut orchestrator);

        assert_eq!(orchestrator.phase(), BuildPhase::Idle);
        assert!(!orchestrator.is_building());
        assert!(orchestrator.in_flight().is_none());
        assert_ne!(orchestrator.worker_id(), crashed);
        assert!(orchestrator.worker_id().is_some());
        assert_eq!(orchestrator.replacements(), 1);

        let failure = orchestrator
            .result()
            .and_then(BuildResult::failure)
            .expect("crash is reported");
        assert_eq!(failure.kind, FailureKind::Crash);

        // The replacement serves the retry
        let replacement = orchestrator.worker_id();
        orchestrator
            .trigger_build(&selection(OK_WIDTH, 4))
            .expect("build dispatched");
        settle(&mut orchestrator);
        assert_eq!(orchestrator.phase(), BuildPhase::Succeeded);
        assert_eq!(orchestrator.worker_id(), replacement);
    }

    // Tests an initialization failure seen while idle triggers replacement
    // Verified by ignoring faults without an outstanding request
    #[test]
    fn test_idle_init_failure_replaced() {
        let mut orchestrator = Orchestrator::new(failing_init_factory()).expect("thread spawns");
        let first = orchestrator.worker_id();

        assert!(orchestrator.wait_for_event(TIMEOUT));
        assert_ne!(orchestrator.worker_id(), first);
        assert_eq!(orchestrator.phase(), BuildPhase::Idle);
        assert!(orchestrator.result().is_none());
    }

    // Tests a build dispatched to a worker that fails to initialize ends as a crash
    // Verified by leaving the phase dispatched on faults
    #[test]
    fn test_init_failure_during_build() {
        let mut orchestrator = Orchestrator::new(failing_init_factory()).expect("thread spawns");
        orchestrator
            .trigger_build(&selection(OK_WIDTH, 4))
            .expect("build dispatched");
        settle(&mut orchestrator);

        let failure = orchestrator
            .result()
            .and_then(BuildResult::failure)
            .expect("crash is reported");
        assert_eq!(failure.kind, FailureKind::Crash);
        assert_eq!(orchestrator.phase(), BuildPhase::Idle);
    }

    // Tests shutdown stops the worker and a later trigger starts a new one
    // Verified by dispatching to the terminated worker
    #[test]
    fn test_shutdown_then_trigger() {
        let mut orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        let original = orchestrator.worker_id();

        orchestrator.shutdown();
        assert!(orchestrator.worker_id().is_none());

        orchestrator
            .trigger_build(&selection(OK_WIDTH, 4))
            .expect("worker restarted on demand");
        assert!(orchestrator.worker_id().is_some());
        assert_ne!(orchestrator.worker_id(), original);
        settle(&mut orchestrator);
        assert_eq!(orchestrator.phase(), BuildPhase::Succeeded);
    }

    // Tests a worker that died while idle is replaced before the next dispatch
    // Verified by dispatching to the dead worker without draining its fault
    #[test]
    fn test_idle_fault_drained_before_dispatch() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut orchestrator =
            Orchestrator::new(flaky_init_factory(Arc::clone(&created))).expect("thread spawns");

        // Let the first worker fail and report without anyone polling
        let deadline = Instant::now() + TIMEOUT;
        while created.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        std::thread::sleep(Duration::from_millis(200));

        orchestrator
            .trigger_build(&selection(OK_WIDTH, 4))
            .expect("build dispatched");
        settle(&mut orchestrator);

        assert_eq!(orchestrator.phase(), BuildPhase::Succeeded);
        assert!(orchestrator.result().and_then(BuildResult::mosaic).is_some());
        assert_eq!(orchestrator.replacements(), 1);
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    // Tests shutdown during a build leaves the orchestrator ready to trigger
    // Verified by keeping the dispatched phase after shutdown
    #[test]
    fn test_shutdown_mid_build() {
        let mut orchestrator = Orchestrator::new(scripted_factory()).expect("worker spawns");
        orchestrator
            .trigger_build(&selection(OK_WIDTH, 4))
            .expect("build dispatched");

        orchestrator.shutdown();
        assert!(!orchestrator.is_building());
        assert_eq!(orchestrator.phase(), BuildPhase::Idle);
        assert!(orchestrator.in_flight().is_none());

        orchestrator
            .trigger_build(&selection(OK_WIDTH, 4))
            .expect("worker restarted on demand");
        settle(&mut orchestrator);
        assert_eq!(orchestrator.phase(), BuildPhase::Succeeded);
    }
}
