// tests/config_loading.rs

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use watchtest::config::{ConfigFile, DEFAULT_DEBOUNCE_MS, load_and_validate, load_from_fs};
use watchtest::errors::WatchtestError;
use watchtest::fs::MockFileSystem;
use watchtest::watch::{GlobClassifier, PathClassifier, ProviderSet};
use watchtest_test_utils::builders::ConfigFileBuilder;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn minimal_config_gets_defaults() {
    let file = write_config(
        r#"
[engine]
cmd = "node run-tests.mjs"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.engine().cmd, "node run-tests.mjs");
    assert_eq!(cfg.watch().debounce_ms, DEFAULT_DEBOUNCE_MS);
    assert!(cfg.tests().files.contains(&"**/*.test.*".to_string()));
    assert!(cfg.rewrites().is_empty());
}

#[test]
fn full_config_round_trips_into_collaborators() {
    let file = write_config(
        r#"
[engine]
cmd = "npm test --"

[tests]
files = ["unit/**/*.js"]
helpers = ["unit/support/**"]
ignored_by_watcher = ["fixtures/**"]

[watch]
debounce_ms = 250
ignore = ["**/*.log"]

[[rewrite]]
source = "src"
compiled = "build"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.watch().debounce_ms, 250);
    assert_eq!(cfg.rewrites().len(), 1);

    let classifier = GlobClassifier::from_config(&cfg).unwrap();
    assert!(classifier.classify("unit/a.js").is_test);
    assert!(!classifier.classify("unit/support/setup.js").is_test);
    assert!(classifier.classify("fixtures/data.json").is_ignored_by_watcher);

    let providers = ProviderSet::from_config(&cfg);
    assert!(providers.ignores("build/unit/a.js"));
    assert_eq!(providers.resolve_test_file("build/unit/a.js"), vec!["src/unit/a.js".to_string()]);
}

#[test]
fn missing_engine_section_is_a_toml_error() {
    let file = write_config(
        r#"
[watch]
debounce_ms = 100
"#,
    );

    match load_and_validate(file.path()) {
        Err(WatchtestError::TomlError(_)) => {}
        other => panic!("Expected TomlError, got: {:?}", other),
    }
}

#[test]
fn empty_command_returns_config_error() {
    let file = write_config(
        r#"
[engine]
cmd = "   "
"#,
    );

    match load_and_validate(file.path()) {
        Err(WatchtestError::ConfigError(msg)) => assert!(msg.contains("cmd")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn too_small_debounce_returns_config_error() {
    let raw = ConfigFileBuilder::new().debounce_ms(5).raw();
    match ConfigFile::try_from(raw) {
        Err(WatchtestError::ConfigError(msg)) => assert!(msg.contains("debounce_ms")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn invalid_glob_is_reported_with_pattern() {
    let raw = ConfigFileBuilder::new().helper("test/[unclosed").raw();
    match ConfigFile::try_from(raw) {
        Err(WatchtestError::InvalidGlob { pattern, .. }) => assert_eq!(pattern, "test/[unclosed"),
        other => panic!("Expected InvalidGlob, got: {:?}", other),
    }
}

#[test]
fn empty_test_globs_are_rejected() {
    let raw = ConfigFileBuilder::new().test_files(&[]).raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(WatchtestError::ConfigError(_))
    ));
}

#[test]
fn identical_rewrite_directories_are_rejected() {
    let raw = ConfigFileBuilder::new().rewrite("src", "src").raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(WatchtestError::ConfigError(_))
    ));
}

#[test]
fn missing_file_is_an_error() {
    let result = load_and_validate(Path::new("/definitely/not/here/Watchtest.toml"));
    assert!(result.is_err());
}

#[test]
fn config_can_be_loaded_through_mock_filesystem() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "proj/Watchtest.toml",
        "[engine]\ncmd = \"make test\"\n[watch]\ndebounce_ms = 40\n",
    );

    let raw = load_from_fs(&fs, Path::new("proj/Watchtest.toml")).unwrap();
    let cfg = ConfigFile::try_from(raw).unwrap();
    assert_eq!(cfg.engine().cmd, "make test");
    assert_eq!(cfg.watch().debounce_ms, 40);
}
