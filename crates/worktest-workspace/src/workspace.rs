//! Workspace location and member labels

use crate::descriptor::parse_members;
use crate::{WorkspaceError, WorkspaceResult, WORKSPACE_FILE};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A Go workspace: the directory holding `go.work` and the modules it uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    members: Vec<PathBuf>,
}

impl Workspace {
    /// Create a workspace from an already known root and member list
    pub fn new(root: impl Into<PathBuf>, members: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            members,
        }
    }

    /// Find the workspace root governing the process current directory
    pub fn locate() -> WorkspaceResult<Option<PathBuf>> {
        let cwd = env::current_dir().map_err(WorkspaceError::CurrentDir)?;
        find_root(&cwd)
    }

    /// Read `go.work` under `root` and resolve its members
    pub fn load(root: &Path) -> WorkspaceResult<Self> {
        let path = root.join(WORKSPACE_FILE);
        let source = fs::read_to_string(&path)
            .map_err(|source| WorkspaceError::ReadDescriptor { path, source })?;

        Ok(Self::new(root, parse_members(root, &source)))
    }

    /// Directory containing `go.work`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute member directories in declaration order
    pub fn members(&self) -> &[PathBuf] {
        &self.members
    }

    /// Path of the descriptor file
    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(WORKSPACE_FILE)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Short display label for a member: its path relative to the root
    pub fn label(&self, member: &Path) -> String {
        relative_label(&self.root, member)
    }
}

/// Walk from `start` towards the filesystem root looking for `go.work`
///
/// Returns `Ok(None)` when no ancestor contains the file. Any directory that
/// cannot be listed aborts the search.
pub fn find_root(start: &Path) -> WorkspaceResult<Option<PathBuf>> {
    let mut current = start.to_path_buf();

    loop {
        let entries = fs::read_dir(&current).map_err(|source| WorkspaceError::ReadDir {
            path: current.clone(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| WorkspaceError::ReadDir {
                path: current.clone(),
                source,
            })?;
            if entry.file_name() == WORKSPACE_FILE {
                return Ok(Some(current));
            }
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Ok(None),
        }
    }
}

/// Express `path` relative to `base`, always with `/` separators
///
/// Paths outside `base` climb out with `..` segments; `base` itself is `.`.
pub fn relative_label(base: &Path, path: &Path) -> String {
    let base: Vec<Component<'_>> = base.components().collect();
    let path: Vec<Component<'_>> = path.components().collect();

    let common = base
        .iter()
        .zip(&path)
        .take_while(|(a, b)| a == b)
        .count();

    let parts: Vec<String> = std::iter::repeat("..".to_string())
        .take(base.len() - common)
        .chain(
            path[common..]
                .iter()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        )
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_label_child() {
        assert_eq!(
            relative_label(Path::new("/ws"), Path::new("/ws/api/v2")),
            "api/v2"
        );
    }

    #[test]
    fn test_relative_label_sibling() {
        assert_eq!(
            relative_label(Path::new("/ws/app"), Path::new("/ws/lib")),
            "../lib"
        );
    }

    #[test]
    fn test_relative_label_same_dir() {
        assert_eq!(relative_label(Path::new("/ws"), Path::new("/ws")), ".");
    }

    #[test]
    fn test_workspace_accessors() {
        let ws = Workspace::new("/ws", vec![PathBuf::from("/ws/a")]);
        assert_eq!(ws.root(), Path::new("/ws"));
        assert_eq!(ws.len(), 1);
        assert!(!ws.is_empty());
        assert_eq!(ws.descriptor_path(), PathBuf::from("/ws/go.work"));
        assert_eq!(ws.label(&ws.members()[0]), "a");
    }
}
