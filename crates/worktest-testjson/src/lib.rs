//! Analysis of `go test -json` output
//!
//! `go test -json` writes one test2json event per line. This crate folds such
//! a stream into an [`Execution`] that answers the questions a summary needs:
//! how many tests ran, which failed, what errors were reported and how long it
//! all took. [`summary::print_summary`] renders the detailed report.
//!
//! # Example
//!
//! ```
//! use worktest_testjson::Execution;
//!
//! let output = br#"{"Action":"run","Package":"example.com/m","Test":"TestOk"}
//! {"Action":"pass","Package":"example.com/m","Test":"TestOk","Elapsed":0.01}
//! "#;
//! let exec = Execution::scan(&output[..]).unwrap();
//! assert_eq!(exec.total(), 1);
//! assert!(exec.failed().is_empty());
//! ```

pub mod event;
pub mod execution;
pub mod summary;

use std::time::Duration;
use thiserror::Error;

/// Errors raised while scanning test output
#[derive(Error, Debug)]
pub enum TestJsonError {
    #[error("Failed to read test output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed test event on line {line}: {source}")]
    MalformedEvent {
        line: usize,
        source: serde_json::Error,
    },
}

/// Result type for scanning operations
pub type TestJsonResult<T> = Result<T, TestJsonError>;

/// Format a duration as seconds with `precision` decimals, e.g. `1.234s`
pub fn format_duration_as_seconds(duration: Duration, precision: usize) -> String {
    format!("{:.*}s", precision, duration.as_secs_f64())
}

pub use event::{Action, TestEvent};
pub use execution::{Execution, Package, TestCase};
pub use summary::print_summary;
