//! Go workspace discovery
//!
//! Locates the `go.work` file that governs the current directory and resolves
//! the member modules it declares.
//!
//! # Resolution
//!
//! 1. Starting at a directory, list its entries looking for `go.work`
//! 2. If it is missing, retry in the parent directory until the filesystem root
//! 3. Read the `use` directives of the file found and join every member path
//!    with the workspace root
//!
//! # Example
//!
//! ```no_run
//! use worktest_workspace::Workspace;
//!
//! if let Some(root) = Workspace::locate().unwrap() {
//!     let workspace = Workspace::load(&root).unwrap();
//!     for member in workspace.members() {
//!         println!("{}", workspace.label(member));
//!     }
//! }
//! ```

pub mod descriptor;
pub mod workspace;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// File name of the workspace descriptor
pub const WORKSPACE_FILE: &str = "go.work";

/// Workspace discovery errors
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Failed to determine current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("Failed to list directory {path}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("Failed to read workspace file {path}: {source}")]
    ReadDescriptor { path: PathBuf, source: io::Error },
}

/// Result type for workspace operations
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

pub use descriptor::{clean_join, parse_members};
pub use workspace::{find_root, relative_label, Workspace};
