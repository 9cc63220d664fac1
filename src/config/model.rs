// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [engine]
/// cmd = "node run-tests.mjs"
///
/// [tests]
/// files = ["test/**/*.js"]
/// helpers = ["test/helpers/**"]
/// ignored_by_watcher = ["dist/**"]
///
/// [watch]
/// debounce_ms = 100
/// ignore = ["**/*.log"]
///
/// [[rewrite]]
/// source = "src/"
/// compiled = "build/"
/// ```
///
/// Only `[engine].cmd` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    pub engine: EngineSection,

    #[serde(default)]
    pub tests: TestsSection,

    #[serde(default)]
    pub watch: WatchSection,

    /// Source/compiled directory pairs, one per `[[rewrite]]` table.
    #[serde(default)]
    pub rewrite: Vec<RewriteConfig>,
}

/// Validated configuration.
///
/// Construct via `ConfigFile::try_from(raw)` (see `validate.rs`) or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    engine: EngineSection,
    tests: TestsSection,
    watch: WatchSection,
    rewrite: Vec<RewriteConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            engine: raw.engine,
            tests: raw.tests,
            watch: raw.watch,
            rewrite: raw.rewrite,
        }
    }

    pub fn engine(&self) -> &EngineSection {
        &self.engine
    }

    pub fn tests(&self) -> &TestsSection {
        &self.tests
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }

    pub fn rewrites(&self) -> &[RewriteConfig] {
        &self.rewrite
    }
}

/// `[engine]` section: how to invoke the test command.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Shell command; selected test files are appended as arguments.
    pub cmd: String,
}

/// `[tests]` section: globs feeding the path classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct TestsSection {
    #[serde(default = "default_test_files")]
    pub files: Vec<String>,

    /// Files matching these are support code, never test files.
    #[serde(default)]
    pub helpers: Vec<String>,

    /// Changes to these files never trigger a rerun.
    #[serde(default)]
    pub ignored_by_watcher: Vec<String>,
}

fn default_test_files() -> Vec<String> {
    vec![
        "test/**/*".to_string(),
        "tests/**/*".to_string(),
        "**/*.test.*".to_string(),
        "**/*.spec.*".to_string(),
    ]
}

impl Default for TestsSection {
    fn default() -> Self {
        Self {
            files: default_test_files(),
            helpers: Vec::new(),
            ignored_by_watcher: Vec::new(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Quiet period before a batch of changes is processed.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Extra ignore globs, on top of the built-in defaults.
    #[serde(default)]
    pub ignore: Vec<String>,
}

pub const DEFAULT_DEBOUNCE_MS: u64 = 100;
pub const MIN_DEBOUNCE_MS: u64 = 10;

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            ignore: Vec::new(),
        }
    }
}

/// `[[rewrite]]` entry: tests are compiled from `source` into `compiled`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RewriteConfig {
    pub source: String,
    pub compiled: String,
}
