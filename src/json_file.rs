//! Whole-file JSON reads and crash-safe pretty writes.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

/// Read a JSON object from disk. A missing file yields `Ok(None)`.
pub fn read_object(path: &Path) -> Result<Option<Map<String, Value>>, JsonFileError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(JsonFileError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    let value: Value = serde_json::from_str(&content).map_err(|e| JsonFileError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(JsonFileError::NotObject(path.to_path_buf())),
    }
}

/// Serialize `value` as pretty JSON and replace the file at `path` with it.
///
/// Writes to a temp file beside the resolved target, then renames over it. A
/// symlinked `path` keeps its link and the file it points at is updated. An
/// existing file keeps its permissions.
pub fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), JsonFileError> {
    let target = resolve_target(path);
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| JsonFileError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let output = serde_json::to_string_pretty(value).map_err(JsonFileError::Serialize)?;
    let write_err = |source| JsonFileError::Write {
        path: path.to_path_buf(),
        source,
    };

    let temp = temp_sibling(&target);
    std::fs::write(&temp, output).map_err(write_err)?;
    let finish = match std::fs::metadata(&target) {
        Ok(meta) => std::fs::set_permissions(&temp, meta.permissions()),
        Err(_) => Ok(()),
    }
    .and_then(|()| std::fs::rename(&temp, &target));
    if let Err(e) = finish {
        let _ = std::fs::remove_file(&temp);
        return Err(write_err(e));
    }

    Ok(())
}

/// Follow symlinks so the rename lands on the real file. Paths that do not
/// exist yet are used as given.
fn resolve_target(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config.json".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
}

#[derive(Debug, thiserror::Error)]
pub enum JsonFileError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Expected a JSON object at the root of {}", .0.display())]
    NotObject(PathBuf),
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize: {0}")]
    Serialize(serde_json::Error),
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
