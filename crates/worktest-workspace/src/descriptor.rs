//! Workspace descriptor parsing
//!
//! Only the `use` directives of `go.work` matter here. Both forms are accepted:
//!
//! ```text
//! use ./tools
//!
//! use (
//!     ./api
//!     ./store // storage backends
//! )
//! ```
//!
//! Everything else in the file (`go`, `toolchain`, `replace`, ...) is ignored.

use std::path::{Component, Path, PathBuf};

/// Extract member directories from descriptor source text
///
/// Every member is joined with `root` and lexically cleaned. A descriptor
/// without any `use` directive yields an empty list.
pub fn parse_members(root: &Path, source: &str) -> Vec<PathBuf> {
    let mut members = Vec::new();
    let mut in_block = false;

    for raw in source.lines() {
        let line = strip_comment(raw).trim();

        if in_block {
            if line.contains(')') {
                in_block = false;
            } else if !line.is_empty() {
                members.push(clean_join(root, unquote(line)));
            }
            continue;
        }

        let Some(rest) = use_directive(line) else {
            continue;
        };

        match rest.strip_prefix('(') {
            Some(inner) => {
                // `use ( ./a )` written on one line
                let (entry, closed) = match inner.split_once(')') {
                    Some((entry, _)) => (entry.trim(), true),
                    None => (inner.trim(), false),
                };
                if !entry.is_empty() {
                    members.push(clean_join(root, unquote(entry)));
                }
                in_block = !closed;
            }
            None if !rest.is_empty() => members.push(clean_join(root, unquote(rest))),
            None => {}
        }
    }

    members
}

/// Join `rel` onto `root` and resolve `.` and `..` segments lexically
///
/// Absolute `rel` paths replace `root`, as with [`Path::join`].
pub fn clean_join(root: &Path, rel: &str) -> PathBuf {
    let mut out = PathBuf::new();

    for component in root.join(rel).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the filesystem root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// Return the text after a `use` keyword, if the line is a `use` directive
fn use_directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("use")?;
    if rest.starts_with('(') || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn unquote(entry: &str) -> &str {
    for quote in ['"', '`'] {
        if entry.len() >= 2 && entry.starts_with(quote) && entry.ends_with(quote) {
            return &entry[1..entry.len() - 1];
        }
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_directive_requires_keyword_boundary() {
        assert_eq!(use_directive("use ./a"), Some("./a"));
        assert_eq!(use_directive("use("), Some("("));
        assert_eq!(use_directive("user ./a"), None);
        assert_eq!(use_directive("go 1.22"), None);
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("./a // api"), "./a ");
        assert_eq!(strip_comment("// only a comment"), "");
        assert_eq!(strip_comment("./a"), "./a");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"./with space\""), "./with space");
        assert_eq!(unquote("`./raw`"), "./raw");
        assert_eq!(unquote("./plain"), "./plain");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn test_clean_join_resolves_dots() {
        let root = Path::new("/ws");
        assert_eq!(clean_join(root, "./a"), PathBuf::from("/ws/a"));
        assert_eq!(clean_join(root, "a/./b"), PathBuf::from("/ws/a/b"));
        assert_eq!(clean_join(root, "../other"), PathBuf::from("/other"));
        assert_eq!(clean_join(root, "../../.."), PathBuf::from("/"));
        assert_eq!(clean_join(root, "/abs/mod"), PathBuf::from("/abs/mod"));
    }

    #[test]
    fn test_clean_join_relative_root() {
        assert_eq!(clean_join(Path::new("ws"), "../../x"), PathBuf::from("../x"));
    }
}
