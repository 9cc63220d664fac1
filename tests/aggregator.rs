// tests/aggregator.rs

use std::time::Duration;

use watchtest::types::DirtyPath;
use watchtest::watch::{Expiry, FileChangeAggregator, MIN_QUIET_PERIOD};

fn quiet(ms: u64) -> FileChangeAggregator {
    FileChangeAggregator::new(Duration::from_millis(ms))
}

#[test]
fn first_event_arms_timer_and_later_events_do_not() {
    let mut agg = quiet(100);
    let timer = agg.on_event(DirtyPath::changed("a.js")).expect("armed");
    assert_eq!(timer.delay, Duration::from_millis(100));
    assert!(agg.is_armed());

    assert!(agg.on_event(DirtyPath::changed("b.js")).is_none());
    assert_eq!(agg.pending_len(), 2);
}

#[test]
fn quiet_expiry_flushes_batch() {
    let mut agg = quiet(100);
    let timer = agg.on_event(DirtyPath::changed("a.js")).expect("armed");

    match agg.on_elapsed(timer.token, false) {
        Expiry::Flush(batch) => assert_eq!(batch, vec![DirtyPath::changed("a.js")]),
        other => panic!("expected flush, got {other:?}"),
    }
    assert!(!agg.is_armed());
    assert_eq!(agg.pending_len(), 0);
}

#[test]
fn repeated_path_keeps_latest_kind() {
    let mut agg = quiet(100);
    let timer = agg.on_event(DirtyPath::changed("a.js")).expect("armed");
    agg.on_event(DirtyPath::deleted("a.js"));

    // Second event marks "again", so the first expiry re-arms.
    let Expiry::Rearm(next) = agg.on_elapsed(timer.token, false) else {
        panic!("expected rearm");
    };
    match agg.on_elapsed(next.token, false) {
        Expiry::Flush(batch) => assert_eq!(batch, vec![DirtyPath::deleted("a.js")]),
        other => panic!("expected flush, got {other:?}"),
    }
}

#[test]
fn busy_stream_halves_delay_down_to_floor() {
    let mut agg = quiet(40);
    let mut timer = agg.on_event(DirtyPath::changed("a.js")).expect("armed");
    let mut delays = Vec::new();

    for i in 0..4 {
        agg.on_event(DirtyPath::changed(format!("f{i}.js")));
        match agg.on_elapsed(timer.token, false) {
            Expiry::Rearm(next) => {
                delays.push(next.delay);
                timer = next;
            }
            other => panic!("expected rearm, got {other:?}"),
        }
    }

    assert_eq!(
        delays,
        vec![
            Duration::from_millis(20),
            MIN_QUIET_PERIOD,
            MIN_QUIET_PERIOD,
            MIN_QUIET_PERIOD
        ]
    );
    assert!(matches!(agg.on_elapsed(timer.token, false), Expiry::Flush(b) if b.len() == 5));
}

#[test]
fn expiry_during_run_waits_for_settlement() {
    let mut agg = quiet(100);
    let timer = agg.on_event(DirtyPath::changed("a.js")).expect("armed");

    assert_eq!(agg.on_elapsed(timer.token, true), Expiry::AwaitRun);
    // Same token again while waiting is stale.
    assert_eq!(agg.on_elapsed(timer.token, true), Expiry::Stale);

    match agg.on_run_settled() {
        Expiry::Flush(batch) => assert_eq!(batch.len(), 1),
        other => panic!("expected flush, got {other:?}"),
    }
    assert_eq!(agg.on_run_settled(), Expiry::Stale);
}

#[test]
fn events_during_wait_rearm_after_settlement() {
    let mut agg = quiet(100);
    let timer = agg.on_event(DirtyPath::changed("a.js")).expect("armed");
    assert_eq!(agg.on_elapsed(timer.token, true), Expiry::AwaitRun);
    assert!(agg.on_event(DirtyPath::changed("b.js")).is_none());

    match agg.on_run_settled() {
        Expiry::Rearm(next) => assert_eq!(next.delay, Duration::from_millis(50)),
        other => panic!("expected rearm, got {other:?}"),
    }
}

#[test]
fn cancelled_timer_expiry_is_stale() {
    let mut agg = quiet(100);
    let timer = agg.on_event(DirtyPath::changed("a.js")).expect("armed");

    agg.cancel();
    agg.cancel();
    assert_eq!(agg.on_elapsed(timer.token, false), Expiry::Stale);
    assert!(!agg.is_armed());

    // Pending paths survive a cancel; the next event arms a fresh timer.
    let fresh = agg.on_event(DirtyPath::changed("b.js")).expect("armed");
    assert_ne!(fresh.token, timer.token);
    assert!(matches!(agg.on_elapsed(fresh.token, false), Expiry::Flush(b) if b.len() == 2));
}

#[test]
fn clear_batch_drops_pending_paths() {
    let mut agg = quiet(100);
    agg.on_event(DirtyPath::changed("a.js"));
    agg.cancel();
    agg.clear_batch();
    assert_eq!(agg.pending_len(), 0);
}

#[test]
fn quiet_period_is_clamped_to_floor() {
    let agg = quiet(1);
    assert_eq!(agg.quiet_period(), MIN_QUIET_PERIOD);
}
