use std::cell::Cell;

use super::*;
use crate::scheduler::host::ManualTicks;

fn scheduler(opts: SchedulerOpts) -> (FrameScheduler, ManualTicks) {
    let host = ManualTicks::new();
    let sched = FrameScheduler::new(opts, Box::new(host.clone())).unwrap();
    (sched, host)
}

#[test]
fn start_registers_once_at_target_interval() {
    let (sched, host) = scheduler(SchedulerOpts::default());
    assert!(!sched.is_running());
    sched.start();
    sched.start();
    assert!(sched.is_running());
    assert_eq!(host.scheduled(), 1);
    assert!((host.interval_ms().unwrap() - 1000.0 / 60.0).abs() < 1e-9);

    sched.stop();
    sched.stop();
    assert_eq!(host.cancelled(), 1);
    assert_eq!(host.active(), None);
}

#[test]
fn ticks_are_ignored_while_stopped() {
    let (sched, _) = scheduler(SchedulerOpts::default());
    assert_eq!(sched.tick(16.0), None);
}

#[test]
fn first_tick_has_zero_delta_and_stays_out_of_the_window() {
    let (sched, _) = scheduler(SchedulerOpts::default());
    sched.start();
    let first = sched.tick(100.0).unwrap();
    assert_eq!(first.delta_ms, 0.0);
    assert_eq!(first.frame, 0);
    assert_eq!(first.fps, 0.0);

    let second = sched.tick(120.0).unwrap();
    assert_eq!(second.delta_ms, 20.0);
    assert_eq!(second.frame, 1);
    assert_eq!(second.fps, 50.0);
}

#[test]
fn backwards_time_is_clamped() {
    let (sched, _) = scheduler(SchedulerOpts::default());
    sched.start();
    sched.tick(100.0);
    let ctx = sched.tick(90.0).unwrap();
    assert_eq!(ctx.delta_ms, MIN_FRAME_DELTA_MS);
    let ctx = sched.tick(90.0).unwrap();
    assert_eq!(ctx.delta_ms, MIN_FRAME_DELTA_MS);
    assert!(sched.tick(f64::NAN).is_none());
}

#[test]
fn stop_resets_statistics() {
    let (sched, _) = scheduler(SchedulerOpts::default());
    sched.start();
    for i in 0..10 {
        sched.tick(f64::from(i) * 16.0);
    }
    assert!(sched.current_fps() > 0.0);
    sched.stop();
    assert_eq!(sched.current_fps(), 0.0);
    assert_eq!(sched.performance_metrics(), PerformanceMetrics::EMPTY);

    sched.start();
    assert_eq!(sched.tick(1000.0).unwrap().frame, 0);
}

#[test]
fn callbacks_run_in_order_and_survive_failures() {
    let (sched, _) = scheduler(SchedulerOpts::default());
    let order = Rc::new(RefCell::new(Vec::new()));

    let o = Rc::clone(&order);
    sched.add_frame_callback(move |ctx| {
        o.borrow_mut().push(("a", ctx.frame));
        anyhow::bail!("boom")
    });
    sched.add_frame_callback(|_| panic!("callback panic"));
    let o = Rc::clone(&order);
    sched.add_frame_callback(move |ctx| {
        o.borrow_mut().push(("c", ctx.frame));
        Ok(())
    });

    sched.start();
    sched.tick(0.0);
    sched.tick(16.0);
    assert_eq!(
        *order.borrow(),
        vec![("a", 0), ("c", 0), ("a", 1), ("c", 1)]
    );
}

#[test]
fn removed_callbacks_stop_running() {
    let (sched, _) = scheduler(SchedulerOpts::default());
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    let id = sched.add_frame_callback(move |_| {
        h.set(h.get() + 1);
        Ok(())
    });
    sched.start();
    sched.tick(0.0);
    assert!(sched.remove_frame_callback(id));
    assert!(!sched.remove_frame_callback(id));
    sched.tick(16.0);
    assert_eq!(hits.get(), 1);
}

#[test]
fn sustained_slow_frames_advise_lower_quality() {
    let (sched, _) = scheduler(SchedulerOpts::default());
    let deltas = Rc::new(RefCell::new(Vec::new()));
    let d = Rc::clone(&deltas);
    sched.add_quality_callback(move |change| d.borrow_mut().push(change.delta));

    sched.start();
    // 25 fps for a little over three assessment intervals.
    let mut t = 0.0;
    while t <= 3100.0 {
        sched.tick(t);
        t += 40.0;
    }
    assert_eq!(*deltas.borrow(), vec![-1]);
}

#[test]
fn frame_signal_follows_ticks() {
    let (sched, _) = scheduler(SchedulerOpts::default());
    let signal = sched.frame_signal();
    sched.start();
    sched.tick(5.0);
    assert_eq!(signal.latest(), Some(FrameTime::new(0, 5.0, 0.0)));
    sched.tick(21.0);
    assert_eq!(signal.latest(), Some(FrameTime::new(1, 21.0, 16.0)));

    // Time spent stopped is not reported as a delta.
    sched.stop();
    sched.start();
    sched.tick(900.0);
    assert_eq!(signal.latest(), Some(FrameTime::new(0, 900.0, 0.0)));
}

#[test]
fn invalid_options_are_rejected() {
    let bad = [
        SchedulerOpts {
            target_fps: 0.0,
            ..SchedulerOpts::default()
        },
        SchedulerOpts {
            window_size: 0,
            ..SchedulerOpts::default()
        },
        SchedulerOpts {
            quality: QualityOpts {
                low_fps: 60.0,
                high_fps: 30.0,
                ..QualityOpts::default()
            },
            ..SchedulerOpts::default()
        },
    ];
    for opts in bad {
        assert!(matches!(
            FrameScheduler::new(opts, Box::new(ManualTicks::new())),
            Err(PlayerError::Validation(_))
        ));
    }
}

#[test]
fn opts_deserialize_with_defaults() {
    let opts: SchedulerOpts =
        serde_json::from_str(r#"{ "target_fps": 30, "quality": { "enabled": false } }"#).unwrap();
    assert_eq!(opts.target_fps, 30.0);
    assert_eq!(opts.window_size, 60);
    assert!(!opts.quality.enabled);
    assert_eq!(opts.quality.sustain_checks, 3);
}
