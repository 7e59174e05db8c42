//! # Target Resolution
//!
//! Expands the user's `target` into the ordered list of files to check.
//! A file is checked on its own. A directory contributes its immediate
//! `.json`, `.yaml` and `.yml` entries, sorted by file name. Both modes
//! accept the same extension set.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::document::DocumentFormat;
use crate::error::CheckError;

/// Resolve `target` into the files a run should check, in check order.
///
/// Symlinks are followed. Relative paths resolve against the current
/// working directory.
///
/// # Errors
///
/// - [`CheckError::TargetNotFound`] if nothing exists at `target`.
/// - [`CheckError::UnsupportedFormat`] if `target` is a file with an
///   ineligible extension.
/// - [`CheckError::NoEligibleFiles`] if `target` is a directory without a
///   single eligible file.
/// - [`CheckError::InvalidTargetType`] if `target` is neither a regular
///   file nor a directory.
/// - [`CheckError::Io`] if `target` exists but cannot be inspected.
pub fn resolve_targets(target: &Path) -> Result<Vec<PathBuf>, CheckError> {
    let metadata = std::fs::metadata(target).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            CheckError::TargetNotFound {
                path: target.to_path_buf(),
            }
        } else {
            CheckError::Io {
                path: target.to_path_buf(),
                source,
            }
        }
    })?;

    if metadata.is_file() {
        return match DocumentFormat::from_path(target) {
            DocumentFormat::Unsupported(extension) => Err(CheckError::UnsupportedFormat {
                path: target.to_path_buf(),
                extension,
            }),
            _ => Ok(vec![target.to_path_buf()]),
        };
    }

    if metadata.is_dir() {
        let files = eligible_entries(target)?;
        if files.is_empty() {
            return Err(CheckError::NoEligibleFiles {
                path: target.to_path_buf(),
            });
        }
        tracing::debug!(dir = %target.display(), count = files.len(), "resolved target directory");
        return Ok(files);
    }

    Err(CheckError::InvalidTargetType {
        path: target.to_path_buf(),
    })
}

/// Immediate regular files in `dir` with an eligible extension, sorted.
fn eligible_entries(dir: &Path) -> Result<Vec<PathBuf>, CheckError> {
    let io_err = |source: std::io::Error| CheckError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_file = match std::fs::metadata(&path) {
            Ok(meta) => meta.is_file(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !is_file {
            tracing::debug!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        if !DocumentFormat::from_path(&path).is_supported() {
            tracing::debug!(path = %path.display(), "skipping file with ineligible extension");
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"{}").unwrap();
    }

    #[test]
    fn missing_target_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_targets(&dir.path().join("config")).unwrap_err();
        assert!(matches!(err, CheckError::TargetNotFound { .. }), "got {err}");
    }

    #[test]
    fn single_file_targets() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["app.json", "app.yaml", "app.yml"] {
            let path = dir.path().join(name);
            touch(&path);
            assert_eq!(resolve_targets(&path).unwrap(), vec![path]);
        }
    }

    #[test]
    fn single_file_with_other_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        touch(&path);
        assert!(matches!(
            resolve_targets(&path).unwrap_err(),
            CheckError::UnsupportedFormat { .. }
        ));
    }

    #[test]
    fn directory_lists_eligible_files_sorted_and_non_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.yaml"));
        touch(&dir.path().join("a.json"));
        touch(&dir.path().join("c.yml"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("README"));
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        touch(&nested.join("deep.json"));
        std::fs::create_dir(dir.path().join("dir.json")).unwrap();

        let files = resolve_targets(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.yaml", "c.yml"]);
    }

    #[test]
    fn directory_without_eligible_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("notes.txt"));
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let err = resolve_targets(dir.path()).unwrap_err();
        assert!(matches!(err, CheckError::NoEligibleFiles { .. }), "got {err}");
    }

    #[test]
    fn empty_directory_has_no_eligible_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            resolve_targets(dir.path()).unwrap_err(),
            CheckError::NoEligibleFiles { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_followed() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.data");
        touch(&real);
        let link = dir.path().join("link.json");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert_eq!(resolve_targets(dir.path()).unwrap(), vec![link]);
    }

    #[cfg(unix)]
    #[test]
    fn device_file_is_invalid_target() {
        let dev_null = Path::new("/dev/null");
        if dev_null.exists() {
            assert!(matches!(
                resolve_targets(dev_null).unwrap_err(),
                CheckError::InvalidTargetType { .. }
            ));
        }
    }
}
