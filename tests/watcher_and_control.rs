// tests/watcher_and_control.rs

use std::path::{Path, PathBuf};

use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tokio::sync::mpsc;
use watchtest::engine::SessionEvent;
use watchtest::fs::MockFileSystem;
use watchtest::types::DirtyPath;
use watchtest::watch::path_utils::normalize_reported_path;
use watchtest::watch::{ControlCommand, dirty_paths_from_event, spawn_control_reader};
use watchtest_test_utils::with_timeout;

fn root() -> PathBuf {
    PathBuf::from("/project")
}

fn event(kind: EventKind, paths: &[&str]) -> Event {
    paths
        .iter()
        .fold(Event::new(kind), |ev, p| ev.add_path(PathBuf::from(p)))
}

#[test]
fn modified_file_becomes_changed_relative_path() {
    let fs = MockFileSystem::new();
    fs.add_file("/project/test/a.js", "");

    let ev = event(
        EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        &["/project/test/a.js"],
    );
    assert_eq!(
        dirty_paths_from_event(&fs, &root(), &ev),
        vec![DirtyPath::changed("test/a.js")]
    );
}

#[test]
fn removed_or_vanished_files_become_deleted() {
    let fs = MockFileSystem::new();
    fs.add_file("/project/src/kept.js", "");

    let removed = event(EventKind::Remove(RemoveKind::File), &["/project/src/kept.js"]);
    assert_eq!(
        dirty_paths_from_event(&fs, &root(), &removed),
        vec![DirtyPath::deleted("src/kept.js")]
    );

    // A create event for a path that is already gone again.
    let vanished = event(EventKind::Create(CreateKind::File), &["/project/src/tmp.js"]);
    assert_eq!(
        dirty_paths_from_event(&fs, &root(), &vanished),
        vec![DirtyPath::deleted("src/tmp.js")]
    );
}

#[test]
fn access_events_directories_and_foreign_paths_are_dropped() {
    let fs = MockFileSystem::new();
    fs.add_file("/project/src/lib/a.js", "");

    let access = event(EventKind::Access(AccessKind::Any), &["/project/src/lib/a.js"]);
    assert!(dirty_paths_from_event(&fs, &root(), &access).is_empty());

    let dir = event(EventKind::Create(CreateKind::Folder), &["/project/src/lib"]);
    assert!(dirty_paths_from_event(&fs, &root(), &dir).is_empty());

    let outside = event(
        EventKind::Modify(ModifyKind::Any),
        &["/elsewhere/a.js", "/project"],
    );
    assert!(dirty_paths_from_event(&fs, &root(), &outside).is_empty());
}

#[test]
fn reported_paths_are_normalised() {
    let root = Path::new("/project");
    assert_eq!(normalize_reported_path(root, "/project/test/a.js"), "test/a.js");
    assert_eq!(normalize_reported_path(root, "./test/a.js"), "test/a.js");
    assert_eq!(normalize_reported_path(root, "test/a.js"), "test/a.js");
}

#[test]
fn control_commands_parse() {
    assert_eq!(ControlCommand::parse("r"), Some(ControlCommand::RerunAll));
    assert_eq!(ControlCommand::parse(" rs \n"), Some(ControlCommand::RerunAll));
    assert_eq!(ControlCommand::parse("U"), Some(ControlCommand::UpdateSnapshots));
    assert_eq!(ControlCommand::parse(""), None);
    assert_eq!(ControlCommand::parse("rerun"), None);
}

#[tokio::test]
async fn control_reader_forwards_recognised_lines_until_eof() {
    let (tx, mut rx) = mpsc::channel(8);
    let input: &'static [u8] = b"r\nhello\nu\n  rs  \n";

    let handle = spawn_control_reader(input, tx);
    with_timeout(handle).await.expect("reader task");

    let mut commands = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            SessionEvent::Control(cmd) => commands.push(cmd),
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(
        commands,
        vec![
            ControlCommand::RerunAll,
            ControlCommand::UpdateSnapshots,
            ControlCommand::RerunAll
        ]
    );
}
