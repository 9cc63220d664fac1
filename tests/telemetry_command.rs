// tests/telemetry_command.rs

use std::collections::BTreeSet;

use tokio::sync::mpsc;
use watchtest::engine::SessionEvent;
use watchtest::exec::{
    CommandEngine, ExecutionEngine, FailureKind, StatusAccumulator, TelemetryEvent, TelemetrySink,
    command_args, parse_telemetry_line,
};
use watchtest::report::describe_run;
use watchtest::types::RunInstruction;
use watchtest_test_utils::with_timeout;

fn instruction(files: &[&str], filter: &[&str]) -> RunInstruction {
    RunInstruction {
        files: files.iter().map(|f| f.to_string()).collect::<BTreeSet<_>>(),
        is_first_run: false,
        previous_failure_count: 0,
        run_only_exclusive: false,
        update_snapshots: false,
        generation: 3,
        filter: filter.iter().map(|f| f.to_string()).collect(),
    }
}

#[test]
fn telemetry_lines_parse_from_camel_case_json() {
    let line = r#"::watchtest::{"type":"worker-finished","testFile":"test/a.js","selectedTests":1,"declaredTests":4}"#;
    let event = parse_telemetry_line(line).expect("telemetry").expect("valid json");
    assert_eq!(event, TelemetryEvent::worker_finished("test/a.js", 1, 4));

    let touched = r#"::watchtest::{"type":"touched-files","changedFiles":["a.snap"]}"#;
    let event = parse_telemetry_line(touched).expect("telemetry").expect("valid json");
    assert_eq!(
        event,
        TelemetryEvent::touched(vec!["a.snap".to_string()], Vec::new())
    );
}

#[test]
fn ordinary_and_malformed_lines() {
    assert!(parse_telemetry_line("  ✔ adds numbers").is_none());
    assert!(matches!(
        parse_telemetry_line("::watchtest::{not json"),
        Some(Err(_))
    ));
}

#[test]
fn failure_classification_excludes_timeouts() {
    assert_eq!(
        TelemetryEvent::test_failed("test/a.js").failure(),
        Some((FailureKind::TestFailed, Some("test/a.js")))
    );
    assert_eq!(
        TelemetryEvent::ProcessExit { test_file: None }.failure(),
        Some((FailureKind::ProcessExit, None))
    );
    assert_eq!(TelemetryEvent::Timeout { test_file: None }.failure(), None);
    assert_eq!(TelemetryEvent::worker_finished("t.js", 1, 1).failure(), None);
}

#[test]
fn accumulator_counts_failures_and_file_stats() {
    let mut acc = StatusAccumulator::new();
    acc.observe(&TelemetryEvent::test_failed("test/a.js"));
    acc.observe(&TelemetryEvent::ProcessExit { test_file: None });
    acc.observe(&TelemetryEvent::Timeout { test_file: None });
    acc.observe(&TelemetryEvent::worker_finished("test/a.js", 2, 3));

    let status = acc.finish();
    assert_eq!(status.failures.failed_tests, 1);
    assert_eq!(status.failures.failed_workers, 1);
    assert_eq!(status.failures.timeouts, 1);
    assert_eq!(status.failures.total(), 3);
    let stats = status.file_stats("test/a.js").expect("stats");
    assert_eq!((stats.selected_tests, stats.declared_tests), (2, 3));
}

#[test]
fn command_args_use_files_or_filter() {
    assert_eq!(
        command_args(&instruction(&["test/b.js", "test/a.js"], &["x"])),
        vec!["test/a.js".to_string(), "test/b.js".to_string()]
    );
    assert_eq!(
        command_args(&instruction(&[], &["test/unit/**"])),
        vec!["test/unit/**".to_string()]
    );
}

#[test]
fn run_description_mentions_scope_and_flags() {
    let mut inst = instruction(&[], &[]);
    assert!(describe_run(&inst).contains("all test files"));

    inst.update_snapshots = true;
    inst.files.insert("test/a.js".to_string());
    let line = describe_run(&inst);
    assert!(line.contains("test/a.js"));
    assert!(line.contains("updating snapshots"));
}

#[cfg(unix)]
#[tokio::test]
async fn command_engine_streams_telemetry_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let cmd = r#"echo '::watchtest::{"type":"test-failed","testFile":"test/a.js"}'; echo plain output; true"#;
    let mut engine = CommandEngine::new(cmd, dir.path());
    let (tx, mut rx) = mpsc::channel(16);

    let status = with_timeout(engine.run(instruction(&["test/a.js"], &[]), TelemetrySink::new(3, tx)))
        .await
        .expect("command ran");
    assert_eq!(status.failures.failed_tests, 1);

    match rx.try_recv() {
        Ok(SessionEvent::Telemetry { generation, event }) => {
            assert_eq!(generation, 3);
            assert_eq!(event, TelemetryEvent::test_failed("test/a.js"));
        }
        other => panic!("expected telemetry, got {other:?}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn non_utf8_output_does_not_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let cmd = r#"printf 'binary \377 output\n'; printf 'err \377\n' >&2; echo '::watchtest::{"type":"test-failed","testFile":"test/b.js"}'; echo ok"#;
    let mut engine = CommandEngine::new(cmd, dir.path());
    let (tx, mut rx) = mpsc::channel(16);

    let status = with_timeout(engine.run(instruction(&["test/b.js"], &[]), TelemetrySink::new(2, tx)))
        .await
        .expect("invalid UTF-8 is test output, not an engine error");
    assert_eq!(status.failures.failed_tests, 1);
    assert_eq!(status.failures.internal_errors, 0);

    match rx.try_recv() {
        Ok(SessionEvent::Telemetry { event, .. }) => {
            assert_eq!(event, TelemetryEvent::test_failed("test/b.js"));
        }
        other => panic!("expected telemetry, got {other:?}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn failing_command_without_telemetry_counts_as_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = CommandEngine::new("false", dir.path());
    let (tx, mut rx) = mpsc::channel(16);

    let status = with_timeout(engine.run(instruction(&[], &[]), TelemetrySink::new(1, tx)))
        .await
        .expect("command ran");
    assert_eq!(status.failures.internal_errors, 1);
    assert!(matches!(
        rx.try_recv(),
        Ok(SessionEvent::Telemetry {
            event: TelemetryEvent::InternalError { .. },
            ..
        })
    ));
}
