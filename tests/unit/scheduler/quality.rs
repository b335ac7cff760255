use super::*;
use crate::scheduler::stats::Grade;

fn metrics(fps: f64) -> PerformanceMetrics {
    PerformanceMetrics {
        fps,
        average_frame_time_ms: 1000.0 / fps,
        frame_time_variance: 0.0,
        stable: true,
        grade: Grade::A,
    }
}

fn monitor() -> QualityMonitor {
    QualityMonitor::new(QualityOpts::default())
}

#[test]
fn first_tick_only_arms_the_cadence() {
    let mut q = monitor();
    assert_eq!(q.observe(0.0, &metrics(10.0)), None);
    assert_eq!(q.observe(999.0, &metrics(10.0)), None);
    assert_eq!(q.low_streak, 0);
    assert_eq!(q.observe(1000.0, &metrics(10.0)), None);
    assert_eq!(q.low_streak, 1);
}

#[test]
fn sustained_low_fps_advises_lower_quality() {
    let mut q = monitor();
    q.observe(0.0, &metrics(30.0));
    assert_eq!(q.observe(1000.0, &metrics(30.0)), None);
    assert_eq!(q.observe(2000.0, &metrics(30.0)), None);
    let change = q.observe(3000.0, &metrics(30.0)).unwrap();
    assert_eq!(change.delta, -1);
    assert_eq!(change.metrics.fps, 30.0);
    // Counters restart after advice.
    assert_eq!(q.observe(4000.0, &metrics(30.0)), None);
}

#[test]
fn sustained_high_fps_advises_higher_quality() {
    let mut q = monitor();
    q.observe(0.0, &metrics(60.0));
    let changes: Vec<_> = (1..=3)
        .filter_map(|i| q.observe(f64::from(i) * 1000.0, &metrics(60.0)))
        .collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].delta, 1);
}

#[test]
fn a_normal_assessment_breaks_the_streak() {
    let mut q = monitor();
    q.observe(0.0, &metrics(30.0));
    q.observe(1000.0, &metrics(30.0));
    q.observe(2000.0, &metrics(30.0));
    q.observe(3000.0, &metrics(50.0));
    assert_eq!(q.observe(4000.0, &metrics(30.0)), None);
    assert_eq!(q.observe(5000.0, &metrics(30.0)), None);
    assert!(q.observe(6000.0, &metrics(30.0)).is_some());
}

#[test]
fn disabled_monitor_never_advises() {
    let mut q = QualityMonitor::new(QualityOpts {
        enabled: false,
        ..QualityOpts::default()
    });
    for i in 0..10 {
        assert_eq!(q.observe(f64::from(i) * 1000.0, &metrics(5.0)), None);
    }
}
