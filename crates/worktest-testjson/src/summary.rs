//! Detailed execution report
//!
//! Layout:
//!
//! ```text
//! DONE 4 tests, 1 failure in 0.120s
//!
//! === Failed
//! === FAIL: example.com/m TestDivide (0.01s)
//!     div_test.go:12: expected 2, got 3
//! ```

use crate::execution::{Execution, TestCase};
use crate::format_duration_as_seconds;
use std::io::{self, Write};

/// Write the full report for `exec`: totals, skipped tests, failed tests with
/// their output, and errors. Sections with nothing to show are omitted.
pub fn print_summary(out: &mut impl Write, exec: &Execution) -> io::Result<()> {
    let skipped = exec.skipped();
    let failed = exec.failed();
    let errors = exec.errors();

    let mut done = format!("DONE {}", pluralize(exec.total(), "test", "tests"));
    if !skipped.is_empty() {
        done.push_str(&format!(", {} skipped", skipped.len()));
    }
    if !failed.is_empty() {
        done.push_str(&format!(", {}", pluralize(failed.len(), "failure", "failures")));
    }
    if !errors.is_empty() {
        done.push_str(&format!(", {}", pluralize(errors.len(), "error", "errors")));
    }
    writeln!(
        out,
        "{done} in {}",
        format_duration_as_seconds(exec.elapsed(), 3)
    )?;

    write_cases(out, "Skipped", "SKIP", &skipped)?;
    write_cases(out, "Failed", "FAIL", &failed)?;

    if !errors.is_empty() {
        writeln!(out)?;
        writeln!(out, "=== Errors")?;
        for error in errors {
            writeln!(out, "{error}")?;
        }
    }

    Ok(())
}

fn write_cases(
    out: &mut impl Write,
    title: &str,
    tag: &str,
    cases: &[&TestCase],
) -> io::Result<()> {
    if cases.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "=== {title}")?;
    for case in cases {
        writeln!(
            out,
            "=== {tag}: {} {} ({})",
            case.package,
            case.name,
            format_duration_as_seconds(case.elapsed, 2)
        )?;
        for line in case.output.iter().filter(|line| !is_framing_line(line)) {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

/// `=== RUN` / `--- PASS` style lines repeat what the header already says
fn is_framing_line(line: &str) -> bool {
    line.starts_with("--- ")
        || ["=== RUN", "=== PAUSE", "=== CONT", "=== NAME"]
            .iter()
            .any(|prefix| line.trim_start().starts_with(prefix))
}

fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
