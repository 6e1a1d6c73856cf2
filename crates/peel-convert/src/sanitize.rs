use std::path::PathBuf;

use crate::{Error, Result};

/// Map a logical leaf path onto a path relative to the extraction root.
///
/// Root markers, drive prefixes and `.` segments are dropped and `..`
/// folds into its parent. A `..` with nothing left to fold into, a NUL
/// byte, or a path with no components is rejected.
pub fn sanitize_logical_path(logical: &str) -> Result<PathBuf> {
    let unsafe_path = || Error::UnsafePath {
        path: logical.to_owned(),
    };
    if logical.contains('\0') {
        return Err(unsafe_path());
    }

    let mut parts: Vec<&str> = Vec::new();
    for (i, component) in logical.split(['/', '\\']).enumerate() {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop().ok_or_else(unsafe_path)?;
            }
            prefix if i == 0 && prefix.ends_with(':') => {}
            part => parts.push(part),
        }
    }

    if parts.is_empty() {
        return Err(unsafe_path());
    }
    Ok(parts.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn strips_root_and_dots() {
        assert_eq!(
            sanitize_logical_path("/data/./archive.tar/file.txt").unwrap(),
            Path::new("data/archive.tar/file.txt")
        );
        assert_eq!(
            sanitize_logical_path("C:\\inputs\\a.zip/x").unwrap(),
            Path::new("inputs/a.zip/x")
        );
    }

    #[test]
    fn folds_parent_segments() {
        assert_eq!(
            sanitize_logical_path("src.tar/dir/../file").unwrap(),
            Path::new("src.tar/file")
        );
    }

    #[test]
    fn rejects_escape() {
        for path in ["src.tar/../../etc/passwd", "..", "a/\0b", "/", "./."] {
            assert!(
                matches!(sanitize_logical_path(path), Err(Error::UnsafePath { .. })),
                "{path:?}"
            );
        }
    }
}
