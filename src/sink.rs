//! Reading the built page and persisting the output document

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::is_glob;
use crate::error::{ConfigError, Error, Result};
use crate::extractors::OutputDocument;

/// Locate the input under `dist_dir`.
///
/// Plain names are joined as-is. Patterns with wildcards pick the
/// lexicographically first matching file.
pub async fn find_input(dist_dir: &Path, pattern: &str) -> Result<PathBuf> {
    let not_found = || Error::InputNotFound {
        pattern: pattern.to_string(),
        dir: dist_dir.to_path_buf(),
    };

    if !is_glob(pattern) {
        let path = dist_dir.join(pattern);
        return match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(not_found()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(Error::io(path, e)),
        };
    }

    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dist_dir.to_string_lossy()),
        pattern
    );
    // Directory walking is blocking I/O
    let matches = tokio::task::spawn_blocking(move || expand_glob(&full))
        .await
        .map_err(|e| Error::io(dist_dir, std::io::Error::other(e)))?
        .map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

    debug!(pattern, count = matches.len(), "expanded input pattern");
    matches.into_iter().next().ok_or_else(not_found)
}

/// Sorted file matches for an absolute glob.
fn expand_glob(full: &str) -> std::result::Result<Vec<PathBuf>, glob::PatternError> {
    let mut matches: Vec<PathBuf> = glob::glob(full)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    matches.sort();
    Ok(matches)
}

pub async fn read_input(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| Error::io(path, e))
}

/// Writes serialized output documents into one directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Serialize `document` to `dir/name` and return the written path.
    ///
    /// The bytes land in a sibling `.tmp` file first and are renamed into
    /// place; a failed write leaves no file at `name`.
    pub async fn write(&self, name: &str, document: &OutputDocument) -> Result<PathBuf> {
        let bytes = serde_json::to_vec(document)?;
        let target = self.dir.join(name);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }

        let mut tmp_name = target.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = target.with_file_name(tmp_name);

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| Error::io(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::io(&target, e));
        }

        info!(path = %target.display(), bytes = bytes.len(), "wrote output document");
        Ok(target)
    }
}
