//! Test command - run the tests of every workspace member

use crate::testing::{PackageAnalysis, PackageRunner, WorkspaceReporter};
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, warn};
use worktest_testjson::format_duration_as_seconds;
use worktest_workspace::{Workspace, WORKSPACE_FILE};

/// Arguments for the test command
#[derive(Debug, Clone)]
pub struct TestArgs {
    /// Print detailed diagnostics for failing packages
    pub show_failures: bool,
    /// Allow `go test` to reuse cached results
    pub use_cache: bool,
    /// Maximum number of packages tested at once
    pub jobs: Option<NonZeroUsize>,
    /// Disable colored output
    pub no_color: bool,
    /// `go` executable
    pub go: PathBuf,
    /// Extra arguments forwarded to `go test`
    pub go_args: Vec<String>,
}

impl Default for TestArgs {
    fn default() -> Self {
        Self {
            show_failures: false,
            use_cache: true,
            jobs: None,
            no_color: false,
            go: PathBuf::from("go"),
            go_args: Vec::new(),
        }
    }
}

/// Aggregate result of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestOutcome {
    /// Packages that were tested
    pub packages: usize,
    /// Packages with failing tests, errors, or that could not run
    pub failed: usize,
}

impl TestOutcome {
    fn from_results(results: &[PackageAnalysis]) -> Self {
        Self {
            packages: results.len(),
            failed: results.iter().filter(|r| r.is_failure()).count(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Run the test command
pub fn run(args: &TestArgs) -> Result<TestOutcome> {
    let start = Instant::now();

    if args.no_color {
        colored::control::set_override(false);
    }

    let outcome = test_workspace(args);

    println!(
        "{}",
        format!(
            "Test execution time: {}",
            format_duration_as_seconds(start.elapsed(), 3)
        )
        .blue()
    );

    if args.no_color {
        colored::control::unset_override();
    }

    outcome
}

fn test_workspace(args: &TestArgs) -> Result<TestOutcome> {
    let Some(workspace) = locate_workspace() else {
        return Ok(TestOutcome::default());
    };
    println!("Using {} file", workspace.descriptor_path().display());

    let runner = PackageRunner::new(&args.go)
        .with_cache(args.use_cache)
        .with_jobs(args.jobs)
        .with_args(&args.go_args);

    let progress = progress_bar(workspace.len())?;
    let results = runner.run(&workspace, |analysis| {
        progress.set_message(analysis.label.clone());
        progress.inc(1);
    });
    progress.finish_and_clear();

    let mut results = results?;
    WorkspaceReporter::new(args.show_failures)
        .report(&mut results)
        .context("Failed to write results")?;

    Ok(TestOutcome::from_results(&results))
}

/// Find and load the workspace around the current directory
///
/// Problems are logged rather than returned: a missing or unreadable
/// workspace simply produces no results.
fn locate_workspace() -> Option<Workspace> {
    let root = match Workspace::locate() {
        Ok(Some(root)) => root,
        Ok(None) => {
            warn!("no {WORKSPACE_FILE} found in the current directory or any parent");
            return None;
        }
        Err(e) => {
            error!("{e}");
            return None;
        }
    };

    match Workspace::load(&root) {
        Ok(workspace) => {
            if workspace.is_empty() {
                warn!(file = %workspace.descriptor_path().display(), "workspace has no members");
            }
            Some(workspace)
        }
        Err(e) => {
            error!("{e}");
            Some(Workspace::new(root, Vec::new()))
        }
    }
}

/// Progress counter on stderr; hidden when stderr is not a terminal
fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} Testing [{pos}/{len}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use worktest_testjson::Execution;

    #[test]
    fn test_outcome_counts_failures() {
        let broken = Execution::scan(&b"# example.com/broken\n"[..]).unwrap();
        let results = vec![
            PackageAnalysis::new("a", Execution::default()),
            PackageAnalysis::new("b", broken),
        ];

        let outcome = TestOutcome::from_results(&results);
        assert_eq!(outcome, TestOutcome { packages: 2, failed: 1 });
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_outcome_empty_is_success() {
        assert!(TestOutcome::default().is_success());
    }

    #[test]
    fn test_args_defaults() {
        let args = TestArgs::default();
        assert!(args.use_cache);
        assert!(!args.show_failures);
        assert_eq!(args.go, PathBuf::from("go"));
    }

    #[test]
    fn test_progress_bar_template_is_valid() {
        let pb = progress_bar(3).unwrap();
        assert_eq!(pb.length(), Some(3));
        pb.finish_and_clear();
    }
}
