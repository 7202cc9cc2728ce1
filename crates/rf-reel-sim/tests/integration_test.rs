//! End-to-End Spin Integration Tests
//!
//! Tests the complete spin loop:
//! - Reel motion driven through the bus
//! - Lifecycle ↔ reel handshake
//! - Button enablement sequence

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_abs_diff_eq;
use parking_lot::Mutex;

use rf_lifecycle::LifecyclePhase;
use rf_reel::{ItemGeometry, MotionConfig, ReelMotionController, Viewport};
use rf_reel_sim::{LayoutConfig, RigConfig, SpinRig, TraceKind};
use rf_signal::{ButtonState, Signal, SignalBus, names};

const DT: f32 = 1.0 / 60.0;

fn stop_counter(bus: &SignalBus) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&count);
    bus.subscribe(names::SPIN_STOPPED, move |_, _| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    count
}

fn rig_with(min_spin_secs: f32, layout: LayoutConfig) -> SpinRig {
    let mut config = RigConfig {
        layout,
        ..RigConfig::default()
    };
    config.lifecycle.min_spin_secs = min_spin_secs;
    SpinRig::new(config).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════════
// REEL OVER THE BUS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_stop_after_two_seconds() {
    let bus = SignalBus::new();
    let reel = Arc::new(Mutex::new(ReelMotionController::from_geometry(
        MotionConfig::default(),
        &ItemGeometry::column(5, 100.0, 100.0),
        None,
    )));
    ReelMotionController::attach(&reel, &bus);
    let stopped = stop_counter(&bus);

    bus.publish(&Signal::SpinStartRequested);
    for _ in 0..120 {
        ReelMotionController::tick_shared(&reel, &bus, DT);
    }
    assert_abs_diff_eq!(reel.lock().speed(), 1500.0, epsilon = 1e-3);

    bus.publish(&Signal::SpinStopRequested);
    assert_eq!(stopped.load(Ordering::SeqCst), 0);

    let mut prev = reel.lock().speed();
    let mut align_at = None;
    let mut settled_at = None;

    for frame in 1..=120 {
        ReelMotionController::tick_shared(&reel, &bus, DT);
        let t = frame as f32 * DT;
        let (speed, aligning) = {
            let reel = reel.lock();
            (reel.speed(), reel.is_aligning())
        };

        if align_at.is_none() && settled_at.is_none() {
            // Linear decay at the deceleration rate
            assert_abs_diff_eq!(prev - speed, 2000.0 * DT, epsilon = 1e-2);
            if aligning {
                assert!(speed <= 45.0, "aligning at {speed}");
                align_at = Some(t);
            }
        }
        if settled_at.is_none() && stopped.load(Ordering::SeqCst) == 1 {
            settled_at = Some(t);
        }
        prev = speed;
    }

    let align_at = align_at.expect("alignment began");
    let settled_at = settled_at.expect("reel settled");
    assert!(settled_at - align_at <= 0.32 + DT + 1e-4);

    let reel = reel.lock();
    assert!(reel.motion().is_at_rest());
    let track = reel.track();
    let centered = track.nearest_to_center().unwrap();
    assert_abs_diff_eq!(
        track.item_center(centered).unwrap(),
        track.center_line(),
        epsilon = 1e-2
    );
    assert_eq!(stopped.load(Ordering::SeqCst), 1);
}

#[test]
fn test_immediate_stop_settles_once() {
    let bus = SignalBus::new();
    let reel = Arc::new(Mutex::new(ReelMotionController::from_geometry(
        MotionConfig::default(),
        &ItemGeometry::column(5, 100.0, 100.0),
        None,
    )));
    ReelMotionController::attach(&reel, &bus);
    let stopped = stop_counter(&bus);

    bus.publish(&Signal::SpinStartRequested);
    ReelMotionController::tick_shared(&reel, &bus, DT);
    bus.publish(&Signal::SpinStopRequested);

    for _ in 0..120 {
        ReelMotionController::tick_shared(&reel, &bus, DT);
    }
    assert_eq!(stopped.load(Ordering::SeqCst), 1);
    assert!(reel.lock().motion().is_at_rest());
}

#[test]
fn test_wrap_keeps_spacing() {
    let mut reel = ReelMotionController::from_geometry(
        MotionConfig::default(),
        &ItemGeometry::column(5, 100.0, 100.0),
        None,
    );
    reel.start_spin();

    for _ in 0..600 {
        reel.update(DT);
        let track = reel.track();
        let mut offsets: Vec<f32> = track.offsets().collect();
        assert_eq!(offsets.len(), 5);

        offsets.sort_by(|a, b| b.total_cmp(a));
        for pair in offsets.windows(2) {
            assert_abs_diff_eq!(pair[0] - pair[1], track.step(), epsilon = 1e-2);
        }
        assert!(offsets[4] >= track.wrap_threshold());
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FULL RIG
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_enablement_sequence() {
    let mut rig = rig_with(2.0, LayoutConfig::default());
    rig.simulate_spin(2.0, DT).unwrap();

    let flags: Vec<ButtonState> = rig.trace().phases().skip(1).map(|(_, _, b)| b).collect();
    assert_eq!(
        flags,
        vec![
            ButtonState::new(true, false),
            ButtonState::new(false, false),
            ButtonState::new(false, true),
            ButtonState::new(false, false),
            ButtonState::new(true, false),
        ]
    );
}

#[test]
fn test_signal_order() {
    let mut rig = rig_with(2.0, LayoutConfig::default());
    let report = rig.simulate_spin(2.0, DT).unwrap();
    assert_abs_diff_eq!(report.spin_secs(), 2.0, epsilon = 2.0 * f64::from(DT));

    let trace = rig.trace();
    let order: Vec<&str> = trace.signals().map(|(_, s)| s.name()).collect();
    assert_eq!(
        order,
        vec![
            names::BUTTON_PRESSED,
            names::SPIN_START_REQUESTED,
            names::BUTTON_PRESSED,
            names::SPIN_STOP_REQUESTED,
            names::SPIN_STOPPED,
        ]
    );

    // Snap happens inside the alignment window
    let align_at = report.align_started_at.unwrap();
    let settle = trace
        .first_after(align_at, |k| matches!(k, TraceKind::Settled { .. }))
        .unwrap();
    assert!(settle - align_at <= 0.32 + f64::from(DT) + 1e-4);
}

#[test]
fn test_presses_while_busy_are_dropped() {
    let mut rig = rig_with(2.0, LayoutConfig::default());
    rig.press_start();
    rig.run_for(1.0, DT).unwrap();

    rig.press_stop();
    rig.press_start();
    assert_eq!(rig.phase(), LifecyclePhase::Accelerating);

    rig.run_for(1.1, DT).unwrap();
    assert_eq!(rig.phase(), LifecyclePhase::Running);
    assert_eq!(rig.trace().count_signal(&Signal::SpinStartRequested), 1);
    assert_eq!(rig.trace().count_signal(&Signal::SpinStopRequested), 0);
}

#[test]
fn test_rest_is_frozen() {
    let mut rig = rig_with(2.0, LayoutConfig::default());
    rig.simulate_spin(2.5, DT).unwrap();
    let before = rig.reel_snapshot();

    for dt in [DT, 1.0 / 30.0, 1.0 / 144.0, 0.05, 0.0, 0.25].repeat(50) {
        rig.tick(dt);
    }
    rig.press_stop();

    assert_eq!(rig.reel_snapshot().offsets, before.offsets);
    assert_eq!(rig.phase(), LifecyclePhase::Idle);
}

#[test]
fn test_empty_reel_does_not_deadlock() {
    let mut rig = rig_with(
        0.5,
        LayoutConfig {
            items: 0,
            ..LayoutConfig::default()
        },
    );
    for _ in 0..3 {
        rig.simulate_spin(0.5, DT).unwrap();
    }
    assert_eq!(rig.completed_spins(), 3);
    assert_eq!(rig.trace().count_signal(&Signal::SpinStopped), 3);
    assert!(rig.reel_snapshot().offsets.is_empty());
}

#[test]
fn test_viewport_geometry() {
    let mut rig = rig_with(
        1.0,
        LayoutConfig {
            items: 8,
            viewport: Some(Viewport::from_edges(0.0, -300.0)),
            ..LayoutConfig::default()
        },
    );
    let snapshot = rig.reel_snapshot();
    assert_eq!(snapshot.center_line, -150.0);
    assert_eq!(snapshot.offsets.len(), 8);

    for hold in [1.37, 2.0, 3.1] {
        let report = rig.simulate_spin(hold, DT).unwrap();
        // Corrections under the snap epsilon settle without easing
        assert!(report.center_error.unwrap().abs() <= 0.5 + 1e-3);
    }
    assert_eq!(rig.effect_plays(), 3);
}
