//! Workspace reporter - display per-package results

use crate::testing::analysis::{PackageAnalysis, Status};
use colored::*;
use std::io::{self, Write};
use worktest_testjson::{format_duration_as_seconds, print_summary};

/// Target width of the failure banner
const BANNER_WIDTH: usize = 80;

/// Reporter for the workspace results table
pub struct WorkspaceReporter {
    /// Print full diagnostics for failing packages
    show_failures: bool,
}

impl Default for WorkspaceReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl WorkspaceReporter {
    pub fn new(show_failures: bool) -> Self {
        Self { show_failures }
    }

    /// Sort `results` and print them to stdout
    pub fn report(&self, results: &mut [PackageAnalysis]) -> io::Result<()> {
        let stdout = io::stdout();
        self.write_report(&mut stdout.lock(), results)
    }

    /// Sort `results` by label and write the table (and failure details)
    pub fn write_report(
        &self,
        out: &mut impl Write,
        results: &mut [PackageAnalysis],
    ) -> io::Result<()> {
        if results.is_empty() {
            return Ok(());
        }

        sort_results(results);
        let width = label_width(results);

        writeln!(out, "\nResults:")?;
        for analysis in results.iter() {
            write_summary_line(out, analysis, width)?;
        }
        writeln!(out)?;

        if self.show_failures {
            for analysis in results.iter().filter(|a| a.is_failure()) {
                write_failure_detail(out, analysis)?;
            }
            writeln!(out)?;
        }

        out.flush()
    }
}

/// Order results by label
pub fn sort_results(results: &mut [PackageAnalysis]) {
    results.sort_by(|a, b| a.label.cmp(&b.label));
}

/// Width of the label column: the longest label plus one
pub fn label_width(results: &[PackageAnalysis]) -> usize {
    results
        .iter()
        .map(|a| a.label.chars().count())
        .max()
        .unwrap_or(0)
        + 1
}

/// `====  label  ====` sized towards [`BANNER_WIDTH`] columns
pub fn banner(label: &str) -> String {
    let eq = "=".repeat(BANNER_WIDTH.saturating_sub(label.chars().count()) / 2);
    format!("{eq}  {label}  {eq}")
}

/// Write the one-line summary for a package
fn write_summary_line(
    out: &mut impl Write,
    analysis: &PackageAnalysis,
    width: usize,
) -> io::Result<()> {
    let status = analysis.status();
    let exec = &analysis.execution;

    let mut line = format!("{} {:<width$}", status.icon(), analysis.label);
    if status != Status::Skipped {
        line.push_str(&format!(
            "  {:>3} tests ({})",
            exec.total(),
            format_duration_as_seconds(exec.elapsed(), 3),
        ));
    }

    if let Some(error) = &analysis.run_error {
        line.push_str(&format!(" ({error})"));
    }
    let errors = exec.errors().len();
    if errors > 0 {
        line.push_str(&format!(" ({errors} errors)"));
    }
    let failed = exec.failed().len();
    if failed > 0 {
        line.push_str(&format!(" ({failed} failed)"));
    }

    writeln!(out, "{line}")
}

/// Write the banner and full diagnostics for a failing package
fn write_failure_detail(out: &mut impl Write, analysis: &PackageAnalysis) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", banner(&analysis.label).red())?;

    if let Some(error) = &analysis.run_error {
        writeln!(out, "{error}")?;
    }
    print_summary(out, &analysis.execution)
}
