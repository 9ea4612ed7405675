//! Filesystem Utilities.
//!
//! Helpers that wrap `std::fs` and map failures to [`CoreError::Filesystem`].

use crate::error::CoreError;
use std::fs;
use std::path::Path;

/// Ensures that a directory exists at `path`, creating parents as needed.
///
/// Fails if the path exists but is not a directory.
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.exists() {
        if path.is_dir() {
            Ok(())
        } else {
            Err(CoreError::Filesystem {
                message: "Path exists but is not a directory".to_string(),
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "Path exists but is not a directory",
                ),
            })
        }
    } else {
        fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
            message: "Failed to create directory".to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Reads the entire contents of a file as bytes.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, CoreError> {
    fs::read(path).map_err(|e| CoreError::Filesystem {
        message: "Failed to read file".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}

/// Removes a file. A file that does not exist counts as removed.
pub fn remove_file_if_exists(path: &Path) -> Result<(), CoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CoreError::Filesystem {
            message: "Failed to remove file".to_string(),
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `content` to `path` through a sibling temporary file and a rename,
/// so readers never observe a half-written file.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent)?;
        }
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content).map_err(|e| CoreError::Filesystem {
        message: "Failed to write temporary file".to_string(),
        path: tmp_path.clone(),
        source: e,
    })?;
    fs::rename(&tmp_path, path).map_err(|e| CoreError::Filesystem {
        message: "Failed to move temporary file into place".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_exists_creates_nested_directories() {
        let temp_root = tempdir().unwrap();
        let nested_dir_path = temp_root.path().join("parent_dir/child_dir");

        ensure_dir_exists(&nested_dir_path).unwrap();
        assert!(nested_dir_path.is_dir());
        // Second call is a no-op.
        ensure_dir_exists(&nested_dir_path).unwrap();
    }

    #[test]
    fn test_ensure_dir_exists_fails_on_file() {
        let temp_root = tempdir().unwrap();
        let file_path = temp_root.path().join("a_file");
        fs::write(&file_path, "x").unwrap();

        let err = ensure_dir_exists(&file_path).unwrap_err();
        assert!(matches!(err, CoreError::Filesystem { .. }));
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let temp_root = tempdir().unwrap();
        let path = temp_root.path().join("store").join("record.json");

        write_atomic(&path, b"[1,2]").unwrap();
        write_atomic(&path, b"[3]").unwrap();
        assert_eq!(read_bytes(&path).unwrap(), b"[3]".to_vec());
        assert!(!temp_root.path().join("store").join("record.json.tmp").exists());
    }

    #[test]
    fn test_bytes_and_remove() {
        let temp_root = tempdir().unwrap();
        let path = temp_root.path().join("blob.json");

        write_atomic(&path, b"{}").unwrap();
        assert_eq!(read_bytes(&path).unwrap(), b"{}".to_vec());
        remove_file_if_exists(&path).unwrap();
        assert!(read_bytes(&path).unwrap_err().is_not_found());
        remove_file_if_exists(&path).unwrap();
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let temp_root = tempdir().unwrap();
        let err = read_bytes(&temp_root.path().join("missing")).unwrap_err();
        assert!(err.is_not_found());
    }
}
