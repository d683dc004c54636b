//! test2json event model

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::time::Duration;

/// What a test2json event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Start,
    Run,
    Pause,
    Cont,
    Pass,
    Bench,
    Fail,
    Output,
    Skip,
    BuildOutput,
    BuildFail,
    /// Actions added by newer Go releases
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Whether the action ends a test or package
    pub fn is_terminal(self) -> bool {
        matches!(self, Action::Pass | Action::Fail | Action::Skip)
    }
}

/// One line of `go test -json` output
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestEvent {
    #[serde(default)]
    pub time: Option<DateTime<FixedOffset>>,
    pub action: Action,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub test: String,
    /// Seconds, only present on terminal events
    #[serde(default)]
    pub elapsed: Option<f64>,
    #[serde(default)]
    pub output: Option<String>,
    /// Import path of the failed build, on `build-output`/`build-fail`
    #[serde(default, rename = "ImportPath")]
    pub import_path: Option<String>,
}

impl TestEvent {
    /// Whether the event concerns the package rather than a single test
    pub fn is_package_event(&self) -> bool {
        self.test.is_empty()
    }

    pub fn elapsed_duration(&self) -> Duration {
        self.elapsed
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or_default()
    }
}
