//! Per-package test analysis records

use colored::{Color, ColoredString, Colorize};
use thiserror::Error;
use worktest_testjson::Execution;

/// Why a package's tests could not be run at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("failed to run: {0}")]
    Spawn(String),
}

/// Outcome shown for a package in the results table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    Skipped,
}

/// Color and glyph used to render a [`Status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub color: Color,
    pub glyph: &'static str,
}

/// Indexed by `Status as usize`
const STATUS_STYLES: [StatusStyle; 3] = [
    StatusStyle {
        color: Color::Green,
        glyph: "✓",
    },
    StatusStyle {
        color: Color::Red,
        glyph: "✖",
    },
    StatusStyle {
        color: Color::Yellow,
        glyph: "∅",
    },
];

impl Status {
    pub fn style(self) -> StatusStyle {
        STATUS_STYLES[self as usize]
    }

    /// Colored glyph for the results table
    pub fn icon(self) -> ColoredString {
        let style = self.style();
        style.glyph.color(style.color)
    }
}

/// Test results for one workspace member
#[derive(Debug, Clone)]
pub struct PackageAnalysis {
    /// Member path relative to the workspace root
    pub label: String,
    pub execution: Execution,
    pub run_error: Option<RunError>,
}

impl PackageAnalysis {
    pub fn new(label: impl Into<String>, execution: Execution) -> Self {
        Self {
            label: label.into(),
            execution,
            run_error: None,
        }
    }

    pub fn with_run_error(mut self, error: RunError) -> Self {
        self.run_error = Some(error);
        self
    }

    /// Anything went wrong: failed tests, reported errors or no run at all
    pub fn is_failure(&self) -> bool {
        self.run_error.is_some() || self.execution.has_failures()
    }

    /// Zero tests and no run error is a skip, even when errors were reported
    pub fn status(&self) -> Status {
        if self.run_error.is_none() && self.execution.total() == 0 {
            Status::Skipped
        } else if self.is_failure() {
            Status::Failure
        } else {
            Status::Success
        }
    }
}
