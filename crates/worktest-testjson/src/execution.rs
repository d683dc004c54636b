//! Folding test2json events into an execution record

use crate::event::{Action, TestEvent};
use crate::{TestJsonError, TestJsonResult};
use chrono::{DateTime, FixedOffset};
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::time::Duration;

/// A single test (or subtest) that reached a final state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TestCase {
    /// Import path of the package owning the test
    pub package: String,
    /// Test name, subtests use `Parent/child`
    pub name: String,
    pub elapsed: Duration,
    /// Output lines emitted while the test ran
    pub output: Vec<String>,
}

/// Results for one package
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub passed: Vec<TestCase>,
    pub failed: Vec<TestCase>,
    pub skipped: Vec<TestCase>,
    /// Output not attributed to any test
    pub output: Vec<String>,
    /// Terminal package action, if one was seen
    pub result: Option<Action>,
    pub elapsed: Duration,
    running: HashMap<String, TestCase>,
}

impl Package {
    /// Number of tests that finished (passed, failed or skipped)
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len() + self.skipped.len()
    }

    fn finish_test(&mut self, package: &str, event: &TestEvent) {
        let mut case = self.running.remove(&event.test).unwrap_or_else(|| TestCase {
            package: package.to_string(),
            name: event.test.clone(),
            ..Default::default()
        });
        case.elapsed = event.elapsed_duration();

        match event.action {
            Action::Pass => self.passed.push(case),
            Action::Fail => self.failed.push(case),
            Action::Skip => self.skipped.push(case),
            _ => {}
        }
    }
}

/// Aggregated view of one `go test -json` run
#[derive(Debug, Clone, Default)]
pub struct Execution {
    packages: BTreeMap<String, Package>,
    errors: Vec<String>,
    started: Option<DateTime<FixedOffset>>,
    last_event: Option<DateTime<FixedOffset>>,
}

impl Execution {
    /// Scan a complete test2json stream
    ///
    /// Lines that are not JSON objects (plain build output, `go: ...`
    /// messages) are kept as errors. A line that looks like an event but fails
    /// to decode aborts the scan.
    pub fn scan(mut reader: impl BufRead) -> TestJsonResult<Self> {
        let mut exec = Execution::default();
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let line = String::from_utf8_lossy(&buf);
            exec.add_line(line_no, &line)?;
        }

        exec.finish();
        Ok(exec)
    }

    /// Feed one raw output line
    pub fn add_line(&mut self, line_no: usize, line: &str) -> TestJsonResult<()> {
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
        if line.trim().is_empty() {
            return Ok(());
        }

        if line.trim_start().starts_with('{') {
            let event = serde_json::from_str::<TestEvent>(line)
                .map_err(|source| TestJsonError::MalformedEvent {
                    line: line_no,
                    source,
                })?;
            self.add_event(event);
        } else {
            self.add_error(line);
        }
        Ok(())
    }

    /// Apply a decoded event
    pub fn add_event(&mut self, event: TestEvent) {
        if let Some(time) = event.time {
            if self.started.map_or(true, |start| time < start) {
                self.started = Some(time);
            }
            if self.last_event.map_or(true, |last| time > last) {
                self.last_event = Some(time);
            }
        }

        match event.action {
            Action::BuildOutput => {
                if let Some(output) = &event.output {
                    self.add_error(output.trim_end());
                }
                return;
            }
            Action::BuildFail => return,
            _ => {}
        }

        let name = event.package.clone();
        let package = self.packages.entry(name.clone()).or_default();

        match event.action {
            Action::Run => {
                package.running.insert(
                    event.test.clone(),
                    TestCase {
                        package: name,
                        name: event.test.clone(),
                        ..Default::default()
                    },
                );
            }
            Action::Output => {
                let Some(output) = event.output else {
                    return;
                };
                let output = output.trim_end_matches('\n').to_string();
                match package.running.get_mut(&event.test) {
                    Some(case) if !event.test.is_empty() => case.output.push(output),
                    _ => package.output.push(output),
                }
            }
            action if action.is_terminal() && event.is_package_event() => {
                package.result = Some(action);
                package.elapsed = event.elapsed_duration();

                if action == Action::Fail && package.failed.is_empty() {
                    // Package failed without a failing test: build errors,
                    // a panic in TestMain, a timeout...
                    let lines: Vec<String> = package
                        .output
                        .iter()
                        .filter(|line| !line.trim().is_empty())
                        .cloned()
                        .collect();
                    if lines.is_empty() {
                        self.errors.push(format!("FAIL {name}"));
                    } else {
                        self.errors.extend(lines);
                    }
                }
            }
            action if action.is_terminal() => package.finish_test(&name, &event),
            _ => {}
        }
    }

    /// Record an error line not tied to any test
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Settle tests that never reported a final state
    ///
    /// Tests still running inside a failed package (a panic or timeout killed
    /// the binary) count as failures; anything else is dropped.
    fn finish(&mut self) {
        for package in self.packages.values_mut() {
            if package.running.is_empty() {
                continue;
            }
            let mut orphans: Vec<TestCase> = package.running.drain().map(|(_, c)| c).collect();
            if package.result == Some(Action::Fail) {
                orphans.sort_by(|a, b| a.name.cmp(&b.name));
                package.failed.extend(orphans);
            }
        }
    }

    /// Number of tests that finished across all packages
    pub fn total(&self) -> usize {
        self.packages.values().map(Package::total).sum()
    }

    pub fn failed(&self) -> Vec<&TestCase> {
        self.packages.values().flat_map(|p| &p.failed).collect()
    }

    pub fn skipped(&self) -> Vec<&TestCase> {
        self.packages.values().flat_map(|p| &p.skipped).collect()
    }

    /// Errors reported outside of tests (build failures, stray output)
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Whether any test failed or any error was reported
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty() || self.packages.values().any(|p| !p.failed.is_empty())
    }

    /// Wall time covered by the events
    ///
    /// The span between the first and last event timestamps, or the longest
    /// package elapsed time when that is larger.
    pub fn elapsed(&self) -> Duration {
        let span = match (self.started, self.last_event) {
            (Some(start), Some(last)) => (last - start).to_std().unwrap_or_default(),
            _ => Duration::ZERO,
        };
        let longest = self
            .packages
            .values()
            .map(|p| p.elapsed)
            .max()
            .unwrap_or_default();
        span.max(longest)
    }

    pub fn packages(&self) -> impl Iterator<Item = (&str, &Package)> {
        self.packages.iter().map(|(name, pkg)| (name.as_str(), pkg))
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }
}
