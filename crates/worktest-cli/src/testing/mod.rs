//! Workspace test infrastructure
//!
//! Runs `go test -json` for every workspace member, folds the output into
//! per-package analyses and reports them as a sorted table.

pub mod analysis;
pub mod reporter;
pub mod runner;

pub use analysis::PackageAnalysis;
pub use reporter::WorkspaceReporter;
pub use runner::PackageRunner;
