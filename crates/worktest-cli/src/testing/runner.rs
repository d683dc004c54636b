//! Package runner - execute `go test` for every workspace member

use crate::testing::analysis::{PackageAnalysis, RunError};
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io;
use std::num::NonZeroUsize;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc;
use tracing::{debug, warn};
use worktest_testjson::{Execution, TestJsonResult};
use worktest_workspace::Workspace;

/// Captured result of one `go test` process
#[derive(Debug, Default)]
pub struct PackageOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process never started
    pub status: Option<ExitStatus>,
    pub spawn_error: Option<String>,
}

impl PackageOutput {
    fn spawn_failed(error: io::Error) -> Self {
        Self {
            spawn_error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

/// Runs `go test -json ./...` in each member directory
#[derive(Debug, Clone)]
pub struct PackageRunner {
    /// `go` executable
    program: OsString,
    /// Allow `go test` to reuse cached results
    use_cache: bool,
    /// Upper bound on concurrently running packages
    jobs: Option<NonZeroUsize>,
    /// Extra arguments placed before the package pattern
    extra_args: Vec<OsString>,
}

impl PackageRunner {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            use_cache: true,
            jobs: None,
            extra_args: Vec::new(),
        }
    }

    /// Set whether cached test results may be reused
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Limit how many packages run at once (default: all of them)
    pub fn with_jobs(mut self, jobs: Option<NonZeroUsize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Forward additional flags to `go test`
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Arguments passed to the `go` executable
    pub fn command_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["test".into(), "-json".into()];
        if !self.use_cache {
            args.push("-count=1".into());
        }
        args.extend(self.extra_args.iter().cloned());
        args.push("./...".into());
        args
    }

    /// Test every member of `workspace` concurrently
    ///
    /// `on_finished` is called from worker threads as each package completes.
    /// Results come back in completion order.
    pub fn run<F>(&self, workspace: &Workspace, on_finished: F) -> Result<Vec<PackageAnalysis>>
    where
        F: Fn(&PackageAnalysis) + Sync,
    {
        let members = workspace.members();
        if members.is_empty() {
            return Ok(Vec::new());
        }

        let threads = self
            .jobs
            .map_or(members.len(), |jobs| jobs.get().min(members.len()));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("worktest-{i}"))
            .build()
            .context("Failed to start worker pool")?;

        // Room for every result so workers never wait on the consumer
        let (tx, rx) = mpsc::sync_channel(members.len());
        let on_finished = &on_finished;

        pool.scope(|scope| {
            for member in members {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let label = workspace.label(member);
                    debug!(package = %label, dir = %member.display(), "running tests");

                    let result = analyze(&label, self.run_package(member));
                    if let Ok(analysis) = &result {
                        debug!(
                            package = %label,
                            total = analysis.execution.total(),
                            failed = analysis.is_failure(),
                            "tests finished"
                        );
                        on_finished(analysis);
                    }
                    // The receiver outlives the scope, so this cannot fail
                    let _ = tx.send((label, result));
                });
            }
        });
        drop(tx);

        rx.into_iter()
            .map(|(label, result)| {
                result.with_context(|| format!("Failed to analyze test output for {label}"))
            })
            .collect()
    }

    /// Run `go test` in a single member directory
    pub fn run_package(&self, dir: &Path) -> PackageOutput {
        let output = Command::new(&self.program)
            .args(self.command_args())
            .current_dir(dir)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(out) => PackageOutput {
                stdout: out.stdout,
                stderr: out.stderr,
                status: Some(out.status),
                spawn_error: None,
            },
            Err(e) => PackageOutput::spawn_failed(e),
        }
    }
}

/// Turn captured process output into an analysis record
///
/// A process that exits unsuccessfully without any failing test or reported
/// error (bad flags, missing module, ...) gets its stderr recorded as errors so
/// the package is not mistaken for a pass.
pub fn analyze(label: &str, output: PackageOutput) -> TestJsonResult<PackageAnalysis> {
    if let Some(error) = output.spawn_error {
        warn!(package = %label, %error, "could not start go test");
        return Ok(
            PackageAnalysis::new(label, Execution::default()).with_run_error(RunError::Spawn(error))
        );
    }

    let mut execution = Execution::scan(&output.stdout[..])?;

    if let Some(status) = output.status.filter(|s| !s.success()) {
        if !execution.has_failures() {
            warn!(package = %label, %status, "go test failed without reporting a test failure");

            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut lines = stderr.lines().filter(|l| !l.trim().is_empty()).peekable();
            if lines.peek().is_none() {
                execution.add_error(format!("go test exited with {status}"));
            }
            for line in lines {
                execution.add_error(line);
            }
        }
    }

    Ok(PackageAnalysis::new(label, execution))
}
