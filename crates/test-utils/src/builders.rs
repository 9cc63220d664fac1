#![allow(dead_code)]

use std::sync::Arc;

use watchtest::config::{
    ConfigFile, EngineSection, RawConfigFile, RewriteConfig, TestsSection, WatchSection,
};
use watchtest::engine::RerunCore;
use watchtest::watch::{FileFilter, GlobClassifier, IgnoreMatcher, ProviderSet, RewriteProvider};

/// Project root used by cores built in tests.
pub const TEST_ROOT: &str = "/project";

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                engine: EngineSection {
                    cmd: "node run-tests.mjs".to_string(),
                },
                tests: TestsSection::default(),
                watch: WatchSection::default(),
                rewrite: Vec::new(),
            },
        }
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.config.engine.cmd = cmd.to_string();
        self
    }

    /// Replace the default test globs.
    pub fn test_files(mut self, globs: &[&str]) -> Self {
        self.config.tests.files = globs.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn helper(mut self, glob: &str) -> Self {
        self.config.tests.helpers.push(glob.to_string());
        self
    }

    pub fn ignored_by_watcher(mut self, glob: &str) -> Self {
        self.config.tests.ignored_by_watcher.push(glob.to_string());
        self
    }

    pub fn ignore(mut self, glob: &str) -> Self {
        self.config.watch.ignore.push(glob.to_string());
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.watch.debounce_ms = ms;
        self
    }

    pub fn rewrite(mut self, source: &str, compiled: &str) -> Self {
        self.config.rewrite.push(RewriteConfig {
            source: source.to_string(),
            compiled: compiled.to_string(),
        });
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RerunCore` with a small, predictable project layout:
///
/// - `test/**/*.js` are test files
/// - `test/helpers/**` are helpers
/// - `dist/**` is ignored by the watcher
pub struct CoreBuilder {
    files: Vec<String>,
    helpers: Vec<String>,
    ignored_by_watcher: Vec<String>,
    ignore: Vec<String>,
    providers: ProviderSet,
    filter: Vec<String>,
}

impl CoreBuilder {
    pub fn new() -> Self {
        Self {
            files: vec!["test/**/*.js".to_string()],
            helpers: vec!["test/helpers/**".to_string()],
            ignored_by_watcher: vec!["dist/**".to_string()],
            ignore: Vec::new(),
            providers: ProviderSet::new(),
            filter: Vec::new(),
        }
    }

    pub fn ignore(mut self, glob: &str) -> Self {
        self.ignore.push(glob.to_string());
        self
    }

    pub fn rewrite(mut self, source: &str, compiled: &str) -> Self {
        self.providers = self.providers.with(RewriteProvider::new(source, compiled));
        self
    }

    pub fn filter(mut self, glob: &str) -> Self {
        self.filter.push(glob.to_string());
        self
    }

    pub fn build(self) -> RerunCore {
        let classifier = GlobClassifier::new(&self.files, &self.helpers, &self.ignored_by_watcher)
            .expect("valid classifier globs");
        let ignore = IgnoreMatcher::new(&self.ignore).expect("valid ignore globs");
        let filter = FileFilter::new(self.filter).expect("valid filter globs");
        RerunCore::new(TEST_ROOT, Arc::new(classifier), ignore, self.providers, filter)
    }
}

impl Default for CoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `BTreeSet<String>` from string literals.
pub fn files(paths: &[&str]) -> std::collections::BTreeSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}
