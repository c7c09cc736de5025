//! First-party code overlay.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::{BuildError, Result, ValidationError};

/// Copy each first-party path into the workspace root, by its last path
/// component.
///
/// Nothing is overwritten. A directory merges into an existing directory of
/// the same name, but any file that already exists, or any file/directory
/// type mismatch, fails with `ValidationError::PathCollision`.
///
/// Returns the number of files copied.
pub fn overlay(source_root: &Path, first_party: &[PathBuf], workspace: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in first_party {
        let src = source_root.join(entry);
        let Some(name) = src.file_name() else {
            return Err(ValidationError::InvalidPath {
                path: entry.clone(),
                reason: "has no final component".to_string(),
            }
            .into());
        };
        let dest = workspace.join(name);

        if src.is_dir() {
            copied += copy_dir(&src, &dest)?;
        } else {
            copy_file(&src, &dest)?;
            copied += 1;
        }
        debug!(path = %entry.display(), "copied first-party path");
    }

    Ok(copied)
}

fn kind(path: &Path) -> &'static str {
    if path.is_dir() {
        "directory"
    } else {
        "file"
    }
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        return Err(ValidationError::PathCollision {
            path: dest.to_path_buf(),
            existing: kind(dest),
        }
        .into());
    }

    trace!(from = %src.display(), to = %dest.display(), "copy");
    fs::copy(src, dest).map_err(BuildError::io("copy", src))?;
    Ok(())
}

fn copy_dir(src: &Path, dest: &Path) -> Result<usize> {
    if fs::symlink_metadata(dest).is_ok_and(|meta| !meta.is_dir()) {
        return Err(ValidationError::PathCollision {
            path: dest.to_path_buf(),
            existing: "file",
        }
        .into());
    }

    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            BuildError::Io {
                action: "read",
                path,
                source: e.into(),
            }
        })?;

        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| ValidationError::InvalidPath {
                path: entry.path().to_path_buf(),
                reason: "escapes its source directory".to_string(),
            })?;
        let target = if rel.as_os_str().is_empty() {
            dest.to_path_buf()
        } else {
            dest.join(rel)
        };

        if entry.file_type().is_dir() {
            if target.exists() && !target.is_dir() {
                return Err(ValidationError::PathCollision {
                    path: target,
                    existing: "file",
                }
                .into());
            }
            fs::create_dir_all(&target).map_err(BuildError::io("create", &target))?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let ws = tmp.path().join("package");
        fs::create_dir_all(src.join("events")).unwrap();
        fs::create_dir_all(src.join("utils").join("nested")).unwrap();
        fs::write(src.join("index.py"), "def handler(event, context): pass\n").unwrap();
        fs::write(src.join("events").join("__init__.py"), "").unwrap();
        fs::write(src.join("utils").join("nested").join("log.py"), "").unwrap();
        fs::create_dir_all(&ws).unwrap();
        (tmp, src, ws)
    }

    #[test]
    fn test_copies_files_and_directories_to_root() {
        let (_tmp, src, ws) = setup();
        let paths = vec![
            PathBuf::from("index.py"),
            PathBuf::from("events"),
            PathBuf::from("utils"),
        ];

        let copied = overlay(&src, &paths, &ws).unwrap();

        assert_eq!(copied, 3);
        assert!(ws.join("index.py").is_file());
        assert!(ws.join("events").join("__init__.py").is_file());
        assert!(ws.join("utils").join("nested").join("log.py").is_file());
    }

    #[test]
    fn test_nested_path_lands_at_root() {
        let (_tmp, src, ws) = setup();

        overlay(&src, &[PathBuf::from("utils/nested")], &ws).unwrap();
        assert!(ws.join("nested").join("log.py").is_file());
    }

    #[test]
    fn test_file_over_directory_collides() {
        let (_tmp, src, ws) = setup();
        fs::create_dir(ws.join("index.py")).unwrap();

        let err = overlay(&src, &[PathBuf::from("index.py")], &ws).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Validation(ValidationError::PathCollision {
                existing: "directory",
                ..
            })
        ));
    }

    #[test]
    fn test_directory_over_file_collides() {
        let (_tmp, src, ws) = setup();
        fs::write(ws.join("events"), "not a dir").unwrap();

        let err = overlay(&src, &[PathBuf::from("events")], &ws).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Validation(ValidationError::PathCollision {
                existing: "file",
                ..
            })
        ));
    }

    #[test]
    fn test_nested_directory_over_file_collides() {
        let (_tmp, src, ws) = setup();
        fs::create_dir_all(ws.join("utils")).unwrap();
        fs::write(ws.join("utils").join("nested"), "not a dir").unwrap();

        let err = overlay(&src, &[PathBuf::from("utils")], &ws).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Validation(ValidationError::PathCollision {
                existing: "file",
                ..
            })
        ));
        assert_eq!(
            fs::read_to_string(ws.join("utils").join("nested")).unwrap(),
            "not a dir"
        );
    }

    #[test]
    fn test_directory_merges_without_overwriting() {
        let (_tmp, src, ws) = setup();
        fs::create_dir_all(ws.join("utils")).unwrap();
        fs::write(ws.join("utils").join("dep.py"), "from dependency").unwrap();

        overlay(&src, &[PathBuf::from("utils")], &ws).unwrap();
        assert!(ws.join("utils").join("dep.py").is_file());
        assert!(ws.join("utils").join("nested").join("log.py").is_file());

        fs::write(src.join("utils").join("dep.py"), "first party").unwrap();
        let ws2 = ws.parent().unwrap().join("package2");
        fs::create_dir_all(ws2.join("utils")).unwrap();
        fs::write(ws2.join("utils").join("dep.py"), "from dependency").unwrap();
        assert!(overlay(&src, &[PathBuf::from("utils")], &ws2).is_err());
        assert_eq!(
            fs::read_to_string(ws2.join("utils").join("dep.py")).unwrap(),
            "from dependency"
        );
    }
}
