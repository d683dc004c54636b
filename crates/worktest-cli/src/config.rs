//! CLI configuration via environment variables
//!
//! Settings that are not worth a flag are read from the environment. Flags
//! given on the command line still take precedence.

use std::env;
use std::path::PathBuf;

/// Default tracing filter; the results table is the real output
const DEFAULT_LOG_FILTER: &str = "warn";

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Disable colored output (WORKTEST_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
    /// `go` executable used to run tests (WORKTEST_GO, then $GOROOT/bin/go)
    pub go_binary: PathBuf,
    /// Tracing filter directives (WORKTEST_LOG, then RUST_LOG)
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            no_color: env::var_os("WORKTEST_NO_COLOR").is_some()
                || env::var_os("NO_COLOR").is_some(),
            go_binary: go_binary_from_env(),
            log_filter: env::var("WORKTEST_LOG")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Resolve the `go` executable
///
/// Returns:
/// 1. WORKTEST_GO if set
/// 2. $GOROOT/bin/go if that file exists
/// 3. `go`, looked up on PATH when spawned
fn go_binary_from_env() -> PathBuf {
    if let Some(path) = env::var_os("WORKTEST_GO").filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    if let Some(goroot) = env::var_os("GOROOT").filter(|p| !p.is_empty()) {
        let candidate = PathBuf::from(goroot)
            .join("bin")
            .join(format!("go{}", env::consts::EXE_SUFFIX));
        if candidate.is_file() {
            return candidate;
        }
    }

    PathBuf::from("go")
}
